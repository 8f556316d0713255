//! FFI bindings for VitalSense
//!
//! This module provides C-compatible functions for driving a health profile from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `vitals_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::profile::UserHealthProfile;
use crate::source::parse_snapshot;

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

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Serialize `value` to a caller-owned C string, recording failures
fn json_to_cstr<T: Serialize + ?Sized>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Profile lifecycle
// ============================================================================

/// Opaque handle to a UserHealthProfile
pub struct VitalsProfileHandle {
    profile: UserHealthProfile,
}

/// Create a profile from an initial snapshot JSON object.
///
/// # Safety
/// - `initial_snapshot_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `vitals_profile_free`.
/// - Returns NULL on error; call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_new(
    initial_snapshot_json: *const c_char,
) -> *mut VitalsProfileHandle {
    clear_last_error();

    let json = match cstr_to_string(initial_snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    match parse_snapshot(&json).and_then(UserHealthProfile::new) {
        Ok(profile) => Box::into_raw(Box::new(VitalsProfileHandle { profile })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a profile.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_free(profile: *mut VitalsProfileHandle) {
    if !profile.is_null() {
        drop(Box::from_raw(profile));
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Ingest a snapshot JSON object.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - `snapshot_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (profile unchanged).
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_ingest(
    profile: *mut VitalsProfileHandle,
    snapshot_json: *const c_char,
) -> i32 {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return -1;
    }
    let handle = &mut *profile;

    let json = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return -1;
        }
    };

    match parse_snapshot(&json).and_then(|s| handle.profile.ingest(s)) {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Complete a task by id.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - `task_id` must be a valid null-terminated C string.
/// - Returns the points awarded (0 if the task was already completed), or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_complete_task(
    profile: *mut VitalsProfileHandle,
    task_id: *const c_char,
) -> i64 {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return -1;
    }
    let handle = &mut *profile;

    let id = match cstr_to_string(task_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid task id string pointer");
            return -1;
        }
    };

    match handle.profile.complete_task(&id) {
        Ok(completion) => i64::from(completion.points_awarded()),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Reset all tasks to pending and zero earned points.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns 0 on success, -1 on a null pointer.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_reset_daily(profile: *mut VitalsProfileHandle) -> i32 {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return -1;
    }
    (*profile).profile.reset_daily();
    0
}

// ============================================================================
// Queries
// ============================================================================

/// Current risk score as JSON.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_risk_score(
    profile: *const VitalsProfileHandle,
) -> *mut c_char {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return ptr::null_mut();
    }
    json_to_cstr((*profile).profile.risk_score())
}

/// Last `window` history entries as a JSON array, oldest first.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_history(
    profile: *const VitalsProfileHandle,
    window: u32,
) -> *mut c_char {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return ptr::null_mut();
    }
    json_to_cstr(&(*profile).profile.history(window as usize))
}

/// Active recommendations (with task completion state) as a JSON array.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_recommendations(
    profile: *const VitalsProfileHandle,
) -> *mut c_char {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return ptr::null_mut();
    }
    json_to_cstr((*profile).profile.recommendations())
}

/// Trend warnings from the last ingestion as a JSON array.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_warnings(
    profile: *const VitalsProfileHandle,
) -> *mut c_char {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return ptr::null_mut();
    }
    json_to_cstr((*profile).profile.warnings())
}

/// Points earned since the last daily reset.
///
/// # Safety
/// - `profile` must be a valid pointer returned by `vitals_profile_new`.
/// - Returns -1 on a null pointer.
#[no_mangle]
pub unsafe extern "C" fn vitals_profile_earned_points(profile: *const VitalsProfileHandle) -> i64 {
    clear_last_error();

    if profile.is_null() {
        set_last_error("Null profile pointer");
        return -1;
    }
    i64::from((*profile).profile.earned_points())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by VitalSense functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a VitalSense function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitals_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next VitalSense call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn vitals_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn vitals_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::snapshot;
    use std::ffi::CString;

    fn snapshot_cstr(day: i64, steps: u32) -> CString {
        let mut s = snapshot(day);
        s.activity.steps = steps;
        CString::new(serde_json::to_string(&s).unwrap()).unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        vitals_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_profile_lifecycle() {
        unsafe {
            let profile = vitals_profile_new(snapshot_cstr(0, 8000).as_ptr());
            assert!(!profile.is_null());

            assert_eq!(vitals_profile_ingest(profile, snapshot_cstr(1, 5000).as_ptr()), 0);

            let recs: serde_json::Value =
                serde_json::from_str(&take_string(vitals_profile_recommendations(profile)))
                    .unwrap();
            assert_eq!(recs[0]["title"], "Increase Daily Steps");

            let task = CString::new("task2").unwrap();
            assert_eq!(vitals_profile_complete_task(profile, task.as_ptr()), 15);
            assert_eq!(vitals_profile_complete_task(profile, task.as_ptr()), 0);
            assert_eq!(vitals_profile_earned_points(profile), 15);

            assert_eq!(vitals_profile_reset_daily(profile), 0);
            assert_eq!(vitals_profile_earned_points(profile), 0);

            let history: serde_json::Value =
                serde_json::from_str(&take_string(vitals_profile_history(profile, 1))).unwrap();
            assert_eq!(history.as_array().unwrap().len(), 1);
            assert_eq!(history[0]["activity"]["steps"], 5000);

            let score: serde_json::Value =
                serde_json::from_str(&take_string(vitals_profile_risk_score(profile))).unwrap();
            assert!(score["overall"].as_f64().is_some());

            let warnings = take_string(vitals_profile_warnings(profile));
            assert!(warnings.starts_with('['));

            vitals_profile_free(profile);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new("not json").unwrap();
            assert!(vitals_profile_new(invalid.as_ptr()).is_null());
            let error = vitals_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            let profile = vitals_profile_new(snapshot_cstr(5, 8000).as_ptr());
            assert_eq!(vitals_profile_ingest(profile, snapshot_cstr(4, 8000).as_ptr()), -1);
            let error = CStr::from_ptr(vitals_last_error()).to_str().unwrap();
            assert!(error.contains("Out-of-order"));

            let unknown = CString::new("missing").unwrap();
            assert_eq!(vitals_profile_complete_task(profile, unknown.as_ptr()), -1);

            assert_eq!(vitals_profile_ingest(ptr::null_mut(), invalid.as_ptr()), -1);
            vitals_profile_free(profile);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = vitals_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
