//! Contract tests for the exported C surface, driven exactly the way a
//! mobile host would drive it: C strings in, sentinels and transferred
//! strings out.
//!
//! `palisade_shutdown` is never called here. The runtime is process
//! wide and tests in this binary run in parallel; lifecycle teardown
//! has its own binary (`lifecycle.rs`) where it cannot race anyone.

use std::ffi::{CStr, CString};

use pal_ffi::api::{
    palisade_abi_version, palisade_engine_create, palisade_engine_destroy,
    palisade_engine_get_stats, palisade_engine_load_filter_list, palisade_engine_reset_stats,
    palisade_engine_should_block, palisade_engine_stats_json, palisade_init, palisade_version,
};
use pal_ffi::{palisade_last_error, palisade_string_free, PalisadeStats, PALISADE_ABI_VERSION};

const LIST: &str = "\
! Palisade demo list
||ads.example.com^
||trackers.example.net^
@@||ads.example.com/allowed^
banner*.gif
";

fn engine_with(list: &str) -> u64 {
    assert!(palisade_init());
    let handle = palisade_engine_create();
    assert_ne!(handle, 0);
    assert!(load(handle, list));
    handle
}

fn load(handle: u64, list: &str) -> bool {
    let text = CString::new(list).unwrap();
    unsafe { palisade_engine_load_filter_list(handle, text.as_ptr()) }
}

fn blocked(handle: u64, url: &str) -> bool {
    let url = CString::new(url).unwrap();
    unsafe { palisade_engine_should_block(handle, url.as_ptr()) }
}

fn stats(handle: u64) -> Option<PalisadeStats> {
    let mut out = PalisadeStats {
        blocked: 0,
        allowed: 0,
        saved_bytes: 0,
    };
    unsafe { palisade_engine_get_stats(handle, &mut out) }.then_some(out)
}

fn stats_json(handle: u64) -> Option<serde_json::Value> {
    let raw = palisade_engine_stats_json(handle);
    if raw.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(raw) }.to_str().unwrap().to_owned();
    unsafe { palisade_string_free(raw) };
    Some(serde_json::from_str(&text).unwrap())
}

fn last_error() -> Option<String> {
    let raw = palisade_last_error();
    if raw.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(raw) }.to_str().unwrap().to_owned();
    unsafe { palisade_string_free(raw) };
    Some(text)
}

#[test]
fn full_session_round_trip() {
    let handle = engine_with(LIST);

    assert!(blocked(handle, "https://ads.example.com/pixel"));
    assert!(blocked(handle, "https://sub.trackers.example.net/t.js"));
    assert!(blocked(handle, "https://example.org/banner-wide.gif"));
    assert!(!blocked(handle, "https://example.org/index.html"));
    // The exception overrides the ads.example.com domain rule.
    assert!(!blocked(handle, "https://ads.example.com/allowed/x"));

    let counters = stats(handle).unwrap();
    assert_eq!(counters.blocked, 3);
    assert_eq!(counters.allowed, 2);
    assert_eq!(counters.saved_bytes, 3 * 30_000);

    let json = stats_json(handle).unwrap();
    assert_eq!(json["blocked_count"], 3);
    assert_eq!(json["allowed_count"], 2);
    assert_eq!(json["data_saved"], 90_000);

    assert!(palisade_engine_reset_stats(handle));
    let counters = stats(handle).unwrap();
    assert_eq!((counters.blocked, counters.allowed, counters.saved_bytes), (0, 0, 0));

    assert!(palisade_engine_destroy(handle));
    assert!(!palisade_engine_destroy(handle));
}

#[test]
fn fresh_engine_allows_everything_uncounted() {
    assert!(palisade_init());
    let handle = palisade_engine_create();
    assert_ne!(handle, 0);

    assert!(!blocked(handle, "https://ads.example.com/pixel"));
    assert!(!blocked(handle, "https://example.org/"));

    // No rules installed, so nothing was a real decision.
    let counters = stats(handle).unwrap();
    assert_eq!((counters.blocked, counters.allowed), (0, 0));

    assert!(palisade_engine_destroy(handle));
}

#[test]
fn null_and_malformed_inputs_fail_soft() {
    let handle = engine_with("||ads.example.com^\n");

    // Null URL: fail open, uncounted.
    assert!(!unsafe { palisade_engine_should_block(handle, std::ptr::null()) });

    // Non-UTF-8 URL: fail open, uncounted.
    let bad = [0xffu8, 0xfe, 0x00];
    assert!(!unsafe { palisade_engine_should_block(handle, bad.as_ptr().cast()) });

    // Null list text: rejected, previous rules untouched.
    assert!(!unsafe { palisade_engine_load_filter_list(handle, std::ptr::null()) });
    assert!(last_error().unwrap().contains("null"));
    assert!(blocked(handle, "https://ads.example.com/pixel"));

    let counters = stats(handle).unwrap();
    assert_eq!(counters.blocked, 1);
    assert_eq!(counters.allowed, 0);

    assert!(palisade_engine_destroy(handle));
}

#[test]
fn stale_and_garbage_handles_never_resolve() {
    assert!(palisade_init());
    let handle = palisade_engine_create();
    assert_ne!(handle, 0);
    assert!(palisade_engine_destroy(handle));

    // Every operation on the dead handle is safe and fails soft.
    assert!(!blocked(handle, "https://ads.example.com/pixel"));
    assert!(!load(handle, "||ads.example.com^"));
    assert!(stats(handle).is_none());
    assert!(stats_json(handle).is_none());
    assert!(!palisade_engine_reset_stats(handle));
    assert_eq!(last_error().unwrap(), "invalid engine handle");

    // Handles that were never issued behave the same.
    for garbage in [0u64, u64::MAX, handle.wrapping_add(1)] {
        assert!(!blocked(garbage, "https://ads.example.com/pixel"));
        assert!(stats(garbage).is_none());
        assert!(!palisade_engine_destroy(garbage));
    }
}

#[test]
fn engines_are_isolated() {
    let ads = engine_with("||ads.example.com^\n");
    let social = engine_with("||social.example.com^\n");

    assert!(blocked(ads, "https://ads.example.com/pixel"));
    assert!(!blocked(ads, "https://social.example.com/widget"));
    assert!(blocked(social, "https://social.example.com/widget"));
    assert!(!blocked(social, "https://ads.example.com/pixel"));

    // Counters stay per-engine.
    assert_eq!(stats(ads).unwrap().blocked, 1);
    assert_eq!(stats(social).unwrap().blocked, 1);
    assert_eq!(stats(ads).unwrap().allowed, 1);

    // Destroying one leaves the other fully functional.
    assert!(palisade_engine_destroy(ads));
    assert!(blocked(social, "https://social.example.com/feed"));
    assert!(palisade_engine_destroy(social));
}

#[test]
fn failed_load_keeps_previous_rules_and_stats() {
    let handle = engine_with("||ads.example.com^\n");
    assert!(blocked(handle, "https://ads.example.com/a"));

    // Empty and junk-only lists are rejected.
    assert!(!load(handle, "   \n\n"));
    assert!(last_error().unwrap().contains("empty"));
    assert!(!load(handle, "! only a comment\n###cosmetic\n"));
    assert!(last_error().unwrap().contains("no usable rules"));

    // Last known good is still serving, and the failed loads did not
    // touch the counters.
    assert!(blocked(handle, "https://ads.example.com/b"));
    let counters = stats(handle).unwrap();
    assert_eq!(counters.blocked, 2);
    assert_eq!(counters.allowed, 0);

    // A valid replacement swaps rules without clearing counters.
    assert!(load(handle, "||other.example.net^\n"));
    assert!(!blocked(handle, "https://ads.example.com/c"));
    assert!(blocked(handle, "https://other.example.net/x"));
    let counters = stats(handle).unwrap();
    assert_eq!(counters.blocked, 3);
    assert_eq!(counters.allowed, 1);

    assert!(palisade_engine_destroy(handle));
}

#[test]
fn get_stats_requires_out_pointer() {
    let handle = engine_with("||ads.example.com^\n");
    assert!(!unsafe { palisade_engine_get_stats(handle, std::ptr::null_mut()) });
    assert_eq!(last_error().unwrap(), "null stats pointer");
    assert!(palisade_engine_destroy(handle));
}

#[test]
fn json_view_tracks_canonical_struct() {
    let handle = engine_with("||ads.example.com^\n");

    blocked(handle, "https://ads.example.com/one");
    blocked(handle, "https://ads.example.com/two");
    blocked(handle, "https://fine.example.org/page");

    let counters = stats(handle).unwrap();
    let json = stats_json(handle).unwrap();
    assert_eq!(json["blocked_count"], counters.blocked);
    assert_eq!(json["allowed_count"], counters.allowed);
    assert_eq!(json["data_saved"], counters.saved_bytes);

    assert!(palisade_engine_destroy(handle));
}

#[test]
fn version_strings_are_static_and_stable() {
    let raw = palisade_version();
    assert!(!raw.is_null());
    let version = unsafe { CStr::from_ptr(raw) }.to_str().unwrap();
    assert!(version.contains('.'));

    // Static storage: repeated calls hand back the same pointer, and
    // the caller must not free it.
    assert_eq!(raw, palisade_version());

    assert_eq!(palisade_abi_version(), PALISADE_ABI_VERSION);
}
