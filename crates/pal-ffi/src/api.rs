//! Exported C surface.
//!
//! Every entry point follows the same contract: no panic ever crosses
//! the boundary, invalid input degrades to the operation's sentinel
//! (0, false, null, or an Allow verdict) rather than UB, and the detail
//! behind a sentinel is readable through `palisade_last_error`.

use std::os::raw::c_char;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info, warn};
use pal_compiler::compile_list;
use pal_core::{Engine, StatsSnapshot};

use crate::ffi::{borrow_str, guarded, set_last_error, to_c_string};
use crate::logging;
use crate::registry::{EngineRegistry, RawHandle};

/// Bumped on any breaking change to the exported symbol table.
pub const PALISADE_ABI_VERSION: u32 = 1;

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Process-wide registry. `None` outside the span between
/// `palisade_init` and `palisade_shutdown`; operations in that state
/// fail soft instead of touching freed engines.
static REGISTRY: RwLock<Option<Arc<EngineRegistry>>> = RwLock::new(None);

/// Counters in their canonical order. `saved_bytes` is the estimated
/// transfer volume the blocked requests would have cost.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalisadeStats {
    pub blocked: u64,
    pub allowed: u64,
    pub saved_bytes: u64,
}

impl From<StatsSnapshot> for PalisadeStats {
    fn from(snapshot: StatsSnapshot) -> Self {
        PalisadeStats {
            blocked: snapshot.blocked,
            allowed: snapshot.allowed,
            saved_bytes: snapshot.saved_bytes,
        }
    }
}

fn registry() -> Option<Arc<EngineRegistry>> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn engine(handle: RawHandle) -> Option<Arc<Engine>> {
    registry()?.get(handle)
}

// ============================================================================
// Internal operations (shared by the C exports and the JNI adapters)
// ============================================================================

pub(crate) fn runtime_init() -> bool {
    logging::init_platform_logger();
    let mut guard = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(Arc::new(EngineRegistry::new()));
        info!(
            "palisade {} runtime initialized (abi {})",
            env!("CARGO_PKG_VERSION"),
            PALISADE_ABI_VERSION
        );
    }
    true
}

pub(crate) fn runtime_shutdown() {
    let taken = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(registry) = taken {
        info!(
            "palisade runtime shut down, releasing {} engine(s)",
            registry.live_count()
        );
        // Engines with in-flight calls are freed when those calls
        // release their clones.
    }
}

pub(crate) fn engine_create() -> RawHandle {
    let Some(registry) = registry() else {
        set_last_error("runtime not initialized");
        return 0;
    };
    match registry.create() {
        Some(handle) => {
            debug!("engine created (handle {handle:#x})");
            handle
        }
        None => {
            warn!("engine create refused: registry is full");
            set_last_error("engine limit reached");
            0
        }
    }
}

pub(crate) fn engine_destroy(handle: RawHandle) -> bool {
    let Some(registry) = registry() else {
        set_last_error("runtime not initialized");
        return false;
    };
    if registry.destroy(handle) {
        debug!("engine destroyed (handle {handle:#x})");
        true
    } else {
        set_last_error("invalid engine handle");
        false
    }
}

pub(crate) fn load_filter_list(handle: RawHandle, text: &str) -> bool {
    let Some(engine) = engine(handle) else {
        set_last_error("invalid engine handle");
        return false;
    };
    match compile_list(text) {
        Ok(compiled) => {
            info!(
                "filter list installed: {} rules from {} lines",
                compiled.rules.rule_count(),
                compiled.summary.lines.total
            );
            engine.install(compiled.rules);
            true
        }
        Err(error) => {
            // The previously installed rules stay active.
            warn!("filter list rejected: {error}");
            set_last_error(error.to_string());
            false
        }
    }
}

pub(crate) fn should_block(handle: RawHandle, url: &str) -> bool {
    match engine(handle) {
        Some(engine) => engine.evaluate(url).is_block(),
        // Fail open: a stale handle must never make the host drop traffic.
        None => false,
    }
}

pub(crate) fn engine_stats(handle: RawHandle) -> Option<StatsSnapshot> {
    let engine = engine(handle)?;
    Some(engine.stats())
}

pub(crate) fn stats_json(handle: RawHandle) -> Option<String> {
    let snapshot = engine_stats(handle)?;
    let json = serde_json::json!({
        "blocked_count": snapshot.blocked,
        "allowed_count": snapshot.allowed,
        "data_saved": snapshot.saved_bytes,
    });
    Some(json.to_string())
}

pub(crate) fn reset_stats(handle: RawHandle) -> bool {
    let Some(engine) = engine(handle) else {
        set_last_error("invalid engine handle");
        return false;
    };
    engine.reset_stats();
    true
}

// ============================================================================
// Exported symbols
// ============================================================================

/// Initialize the process-wide runtime: platform logging plus the
/// engine registry. Idempotent; always returns true.
#[no_mangle]
pub extern "C" fn palisade_init() -> bool {
    guarded(false, runtime_init)
}

/// Tear the runtime down. Live handles become invalid; engines still
/// serving an in-flight call are freed when that call returns.
/// Idempotent.
#[no_mangle]
pub extern "C" fn palisade_shutdown() {
    guarded((), runtime_shutdown)
}

/// Allocate a new engine with an empty rule set and zeroed statistics.
/// Returns 0 when the runtime is not initialized or the engine limit is
/// reached.
#[no_mangle]
pub extern "C" fn palisade_engine_create() -> u64 {
    guarded(0, engine_create)
}

/// Destroy the engine behind `handle`. Returns false for a handle that
/// is stale, already destroyed, or was never issued; the call is safe
/// in every case.
#[no_mangle]
pub extern "C" fn palisade_engine_destroy(handle: u64) -> bool {
    guarded(false, || engine_destroy(handle))
}

/// Compile `text` as a filter list and atomically install it, replacing
/// the engine's previous rules. On any failure the previous rules stay
/// installed and false is returned. Statistics are not touched either
/// way.
///
/// # Safety
///
/// `text` must be null or a NUL-terminated string valid for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn palisade_engine_load_filter_list(
    handle: u64,
    text: *const c_char,
) -> bool {
    let text = borrow_str(text);
    guarded(false, || {
        let Some(text) = text else {
            set_last_error("filter list text is null or not valid UTF-8");
            return false;
        };
        load_filter_list(handle, text)
    })
}

/// Decide whether `url` should be blocked. Fails open: null or invalid
/// input, a stale handle, or an uninitialized runtime all return false
/// without recording a decision.
///
/// # Safety
///
/// `url` must be null or a NUL-terminated string valid for the duration
/// of the call.
#[no_mangle]
pub unsafe extern "C" fn palisade_engine_should_block(handle: u64, url: *const c_char) -> bool {
    let url = borrow_str(url);
    guarded(false, || {
        let Some(url) = url else {
            return false;
        };
        should_block(handle, url)
    })
}

/// Copy the engine's counters into `out`. Returns false, leaving `out`
/// untouched, if `out` is null or the handle does not resolve.
///
/// # Safety
///
/// `out` must be null or a valid pointer to a `PalisadeStats`.
#[no_mangle]
pub unsafe extern "C" fn palisade_engine_get_stats(handle: u64, out: *mut PalisadeStats) -> bool {
    if out.is_null() {
        set_last_error("null stats pointer");
        return false;
    }
    let stats = guarded(None, || {
        let Some(snapshot) = engine_stats(handle) else {
            set_last_error("invalid engine handle");
            return None;
        };
        Some(PalisadeStats::from(snapshot))
    });
    match stats {
        Some(stats) => {
            out.write(stats);
            true
        }
        None => false,
    }
}

/// The engine's counters rendered as a JSON object with the keys
/// `blocked_count`, `allowed_count`, and `data_saved`. Null if the
/// handle does not resolve. The caller owns the returned string and
/// must release it with `palisade_string_free`.
#[no_mangle]
pub extern "C" fn palisade_engine_stats_json(handle: u64) -> *mut c_char {
    guarded(std::ptr::null_mut(), || match stats_json(handle) {
        Some(json) => to_c_string(&json),
        None => {
            set_last_error("invalid engine handle");
            std::ptr::null_mut()
        }
    })
}

/// Zero the engine's counters. Decisions concurrent with the reset land
/// in exactly one epoch, either the zeroed counters or the values read
/// before the reset.
#[no_mangle]
pub extern "C" fn palisade_engine_reset_stats(handle: u64) -> bool {
    guarded(false, || reset_stats(handle))
}

/// Crate version as a static NUL-terminated string. The caller must
/// not free it.
#[no_mangle]
pub extern "C" fn palisade_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

/// Version of the exported ABI itself.
#[no_mangle]
pub extern "C" fn palisade_abi_version() -> u32 {
    PALISADE_ABI_VERSION
}
