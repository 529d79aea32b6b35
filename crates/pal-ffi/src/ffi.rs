//! Cross-boundary plumbing: string transfer, the last-error slot, and
//! the panic guard every exported entry point runs under.
//!
//! Ownership rules at the boundary:
//! - `*const c_char` parameters are borrowed from the caller for the
//!   duration of the call and never stored.
//! - `*mut c_char` returns transfer ownership to the caller, who must
//!   hand the pointer back to [`palisade_string_free`] exactly once.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Record the failure detail behind the most recent sentinel return on
/// this thread.
pub(crate) fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = message.into();
    });
}

/// Run an exported operation, converting a panic into that operation's
/// fail-open result. Unwinding must never cross the C boundary; release
/// builds additionally compile with `panic = "abort"`.
pub(crate) fn guarded<T, F: FnOnce() -> T>(fallback: T, operation: F) -> T {
    // AssertUnwindSafe: every shared structure the closure can touch is
    // either atomic or recovers from lock poisoning.
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(value) => value,
        Err(_) => {
            set_last_error("internal error");
            fallback
        }
    }
}

/// Borrow a caller-owned C string for the duration of one call. `None`
/// on null or invalid UTF-8.
pub(crate) unsafe fn borrow_str<'a>(raw: *const c_char) -> Option<&'a str> {
    if raw.is_null() {
        return None;
    }
    CStr::from_ptr(raw).to_str().ok()
}

/// Copy a Rust string into a caller-owned C string. Null on interior
/// NUL, which the boundary treats like any other failed allocation.
pub(crate) fn to_c_string(value: &str) -> *mut c_char {
    CString::new(value)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Release a string previously returned by this library. Null is
/// accepted and ignored so callers can free unconditionally.
///
/// # Safety
///
/// `raw` must be null or a pointer obtained from this library that has
/// not been freed before.
#[no_mangle]
pub unsafe extern "C" fn palisade_string_free(raw: *mut c_char) {
    if raw.is_null() {
        return;
    }
    drop(CString::from_raw(raw));
}

/// Detail for the most recent failure on the calling thread, or null if
/// none was recorded. The returned string is owned by the caller and
/// must be released with [`palisade_string_free`].
#[no_mangle]
pub extern "C" fn palisade_last_error() -> *mut c_char {
    LAST_ERROR.with(|slot| {
        let message = slot.borrow();
        if message.is_empty() {
            std::ptr::null_mut()
        } else {
            to_c_string(&message)
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
