//! FFI bindings for the SenseAware engine
//!
//! C-compatible functions so a mobile host shell can embed the pipeline.
//! All payloads cross the boundary as null-terminated JSON strings; returned
//! strings are allocated here and must be freed with
//! `senseaware_free_string`. A NULL return signals an error whose message is
//! retrievable via `senseaware_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::{EngineConfig, Settings};
use crate::pipeline::{SensorPipeline, SourceAvailability};
use crate::types::SensorEvent;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Create a pipeline with default configuration and settings.
///
/// # Safety
/// The returned handle must be released with `senseaware_pipeline_free`.
#[no_mangle]
pub extern "C" fn senseaware_pipeline_new() -> *mut SensorPipeline {
    clear_last_error();
    Box::into_raw(Box::new(SensorPipeline::default()))
}

/// Create a pipeline from an `EngineConfig` JSON document.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Returns NULL on invalid configuration; see `senseaware_last_error`.
/// - The returned handle must be released with `senseaware_pipeline_free`.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_with_config(
    config_json: *const c_char,
) -> *mut SensorPipeline {
    clear_last_error();

    let Some(json) = cstr_to_string(config_json) else {
        set_last_error("Invalid config string pointer");
        return ptr::null_mut();
    };

    match EngineConfig::from_json(&json) {
        Ok(config) => Box::into_raw(Box::new(SensorPipeline::new(config, Settings::default()))),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Release a pipeline handle.
///
/// # Safety
/// `pipeline` must be a handle returned by a `senseaware_pipeline_*`
/// constructor, and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_free(pipeline: *mut SensorPipeline) {
    if !pipeline.is_null() {
        drop(Box::from_raw(pipeline));
    }
}

/// Start a monitoring session. `sources_json` selects the available streams
/// (pass NULL for all). Returns the session info as JSON.
///
/// # Safety
/// - `pipeline` must be a valid handle.
/// - Free the returned string with `senseaware_free_string`.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_subscribe(
    pipeline: *mut SensorPipeline,
    sources_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(pipeline) = pipeline.as_mut() else {
        set_last_error("Invalid pipeline pointer");
        return ptr::null_mut();
    };

    let sources = match cstr_to_string(sources_json) {
        Some(json) => match serde_json::from_str::<SourceAvailability>(&json) {
            Ok(sources) => sources,
            Err(e) => {
                set_last_error(&format!("Invalid sources JSON: {e}"));
                return ptr::null_mut();
            }
        },
        None => SourceAvailability::default(),
    };

    // FFI hosts poll ticks from handle_event instead of registering a
    // callback across the boundary.
    let info = pipeline.subscribe(sources, |_| {});

    match serde_json::to_string(&info) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// End the current session. Idempotent.
///
/// # Safety
/// `pipeline` must be a valid handle.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_unsubscribe(pipeline: *mut SensorPipeline) {
    if let Some(pipeline) = pipeline.as_mut() {
        pipeline.unsubscribe();
    }
}

/// Feed one sensor event (the `SensorEvent` wire format). Motion events
/// return the produced tick as JSON; cache-only events return the JSON
/// literal `null`.
///
/// # Safety
/// - `pipeline` must be a valid handle and `event_json` a valid C string.
/// - Free the returned string with `senseaware_free_string`.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_handle_event(
    pipeline: *mut SensorPipeline,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(pipeline) = pipeline.as_mut() else {
        set_last_error("Invalid pipeline pointer");
        return ptr::null_mut();
    };

    let Some(json) = cstr_to_string(event_json) else {
        set_last_error("Invalid event string pointer");
        return ptr::null_mut();
    };

    let event: SensorEvent = match serde_json::from_str(&json) {
        Ok(event) => event,
        Err(e) => {
            set_last_error(&format!("Invalid event JSON: {e}"));
            return ptr::null_mut();
        }
    };

    let tick = pipeline.handle_event(&event);
    match serde_json::to_string(&tick) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Stored readings as a JSON array, most recent first.
///
/// # Safety
/// - `pipeline` must be a valid handle.
/// - Free the returned string with `senseaware_free_string`.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_history(
    pipeline: *const SensorPipeline,
) -> *mut c_char {
    clear_last_error();

    let Some(pipeline) = pipeline.as_ref() else {
        set_last_error("Invalid pipeline pointer");
        return ptr::null_mut();
    };

    match serde_json::to_string(&pipeline.history()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Current activity totals as JSON.
///
/// # Safety
/// - `pipeline` must be a valid handle.
/// - Free the returned string with `senseaware_free_string`.
#[no_mangle]
pub unsafe extern "C" fn senseaware_pipeline_totals(
    pipeline: *const SensorPipeline,
) -> *mut c_char {
    clear_last_error();

    let Some(pipeline) = pipeline.as_ref() else {
        set_last_error("Invalid pipeline pointer");
        return ptr::null_mut();
    };

    match serde_json::to_string(&pipeline.totals()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by any `senseaware_*` function.
///
/// # Safety
/// `ptr` must come from this library and must not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn senseaware_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Last error message for the current thread, or NULL when none.
///
/// The pointer stays valid until the next failing call on this thread; do
/// not free it.
#[no_mangle]
pub extern "C" fn senseaware_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}
