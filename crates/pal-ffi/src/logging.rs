//! Platform log backends behind the `log` facade.
//!
//! Installed once from `palisade_init`. Host builds (tests, the CLI)
//! get no backend here and configure their own.

use std::sync::atomic::{AtomicBool, Ordering};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the platform logger for this process. Safe to call from
/// every `palisade_init`; only the first call does anything.
pub(crate) fn init_platform_logger() {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    install();
}

#[cfg(target_os = "android")]
fn install() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("palisade"),
    );
}

#[cfg(target_os = "ios")]
fn install() {
    // An Err only means some logger is already registered.
    let _ = oslog::OsLogger::new("com.palisade.engine")
        .level_filter(log::LevelFilter::Info)
        .init();
}

#[cfg(not(any(target_os = "android", target_os = "ios")))]
fn install() {}
