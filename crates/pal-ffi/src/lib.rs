//! C ABI and JNI boundary for the Palisade filtering engine.
//!
//! The mobile hosts link this crate as a static or dynamic library and
//! talk to it through opaque `u64` engine handles. The exported surface
//! lives in [`api`]; the registry maps handles to engines, and the ffi
//! module carries the string-transfer and last-error plumbing.
//!
//! Boundary contract, in short:
//! - `palisade_init` / `palisade_shutdown` bracket the runtime. Every
//!   other call outside that span fails soft.
//! - Handles are generation-checked. Stale or invented handles resolve
//!   to nothing; they can never reach another engine's memory.
//! - Decisions fail open. Anything the engine cannot parse or resolve
//!   comes back as "allow".
//! - Strings returned as `*mut c_char` are owned by the caller and go
//!   back through `palisade_string_free` exactly once.

pub mod api;
mod ffi;
mod jni;
mod logging;
mod registry;

pub use api::{PalisadeStats, PALISADE_ABI_VERSION};
pub use ffi::{palisade_last_error, palisade_string_free};
pub use registry::MAX_ENGINES;
