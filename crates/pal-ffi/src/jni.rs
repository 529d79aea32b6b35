//! JNI adapters for the Android host.
//!
//! `com.palisade.PalisadeEngine` declares these as its native methods.
//! Each is a thin shim over the C ABI semantics: handles travel as
//! `jlong`, strings cross through `JNIEnv`, and failures map to the
//! same sentinels the C surface uses.

#![cfg(target_os = "android")]

use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use crate::api;
use crate::ffi::guarded;

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeInit(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    to_jboolean(guarded(false, api::runtime_init))
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeCreate(
    _env: JNIEnv,
    _class: JClass,
) -> jlong {
    guarded(0, api::engine_create) as jlong
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeDestroy(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jboolean {
    to_jboolean(guarded(false, || api::engine_destroy(handle as u64)))
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeLoadFilterList(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    filter_list: JString,
) -> jboolean {
    let text: String = match env.get_string(&filter_list) {
        Ok(text) => text.into(),
        Err(_) => return JNI_FALSE,
    };
    to_jboolean(guarded(false, || api::load_filter_list(handle as u64, &text)))
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeShouldBlock(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    url: JString,
) -> jboolean {
    let url: String = match env.get_string(&url) {
        Ok(url) => url.into(),
        // Fail open, matching the C surface.
        Err(_) => return JNI_FALSE,
    };
    to_jboolean(guarded(false, || api::should_block(handle as u64, &url)))
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeGetStatsJson(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let Some(json) = guarded(None, || api::stats_json(handle as u64)) else {
        return std::ptr::null_mut();
    };
    match env.new_string(json.as_str()) {
        Ok(json) => json.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeResetStats(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jboolean {
    to_jboolean(guarded(false, || api::reset_stats(handle as u64)))
}

#[no_mangle]
pub extern "system" fn Java_com_palisade_PalisadeEngine_nativeVersion(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    match env.new_string(env!("CARGO_PKG_VERSION")) {
        Ok(version) => version.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}
