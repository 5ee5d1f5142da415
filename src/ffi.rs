//! C FFI bindings for lanzou-resolver.
//!
//! Provides a simple blocking API for resolving share links from C, Python, Go, etc.
//!
//! # Example (C)
//!
//! ```c
//! #include "lanzou_resolver.h"
//!
//! int main() {
//!     LanzouResult result = lanzou_resolve("https://www.lanzoux.com/iAbc123", NULL, false);
//!     if (result.error_code == 0) {
//!         printf("Download: %s\n", result.download_url);
//!     }
//!     lanzou_free_result(result);
//!     return 0;
//! }
//! ```

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::api::{self, ApiQuery};
use crate::{Lanzou, ResolveOptions};

/// Result structure returned by `lanzou_resolve`.
///
/// All string fields are heap-allocated and must be freed with `lanzou_free_result`.
#[repr(C)]
pub struct LanzouResult {
    /// 0 = success, non-zero = error
    pub error_code: i32,
    /// Error message if error_code != 0, NULL otherwise
    pub error_message: *mut c_char,
    /// Error kind name if error_code != 0, NULL otherwise
    pub error_kind: *mut c_char,
    /// Direct download URL
    pub download_url: *mut c_char,
    /// File name (server label when the size was not probed)
    pub filename: *mut c_char,
    /// File size in bytes, 0 when not probed
    pub filesize: u64,
    /// Number of warnings recorded during resolution
    pub warning_count: u32,
}

impl LanzouResult {
    fn success(download_url: String, filename: String, filesize: u64, warning_count: u32) -> Self {
        Self {
            error_code: 0,
            error_message: ptr::null_mut(),
            error_kind: ptr::null_mut(),
            download_url: string_to_ptr(download_url),
            filename: string_to_ptr(filename),
            filesize,
            warning_count,
        }
    }

    fn error(code: i32, kind: &str, message: String) -> Self {
        Self {
            error_code: code,
            error_message: string_to_ptr(message),
            error_kind: string_to_ptr(kind.to_string()),
            download_url: ptr::null_mut(),
            filename: ptr::null_mut(),
            filesize: 0,
            warning_count: 0,
        }
    }
}

/// Convert Rust String to C string pointer.
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Convert C string to Rust String, returns None if null or invalid UTF-8.
unsafe fn ptr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Resolve a share link (blocking).
///
/// # Parameters
///
/// - `url`: Share page URL (required)
/// - `password`: Optional share password
/// - `get_length`: Probe the final URL for size and filename
///
/// # Returns
///
/// A `LanzouResult` struct. Check `error_code` for success (0) or failure (non-zero).
/// The caller must free the result with `lanzou_free_result`.
///
/// # Safety
///
/// - `url` must be a valid null-terminated C string
/// - `password` must be NULL or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn lanzou_resolve(
    url: *const c_char,
    password: *const c_char,
    get_length: bool,
) -> LanzouResult {
    let url = match ptr_to_string(url) {
        Some(s) if !s.is_empty() => s,
        _ => return LanzouResult::error(1, "invalid_argument", "url is required".to_string()),
    };

    let mut builder = ResolveOptions::builder(url).get_length(get_length);
    if let Some(p) = ptr_to_string(password) {
        builder = builder.password(p);
    }
    let options = builder.build();

    let runtime = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            return LanzouResult::error(2, "runtime", format!("Failed to create runtime: {}", e))
        }
    };

    runtime.block_on(async {
        let client = match Lanzou::new() {
            Ok(c) => c,
            Err(e) => {
                return LanzouResult::error(3, e.kind(), format!("Failed to build client: {}", e))
            }
        };

        match client.resolve(&options).await {
            Ok(result) => LanzouResult::success(
                result.down_url.to_string(),
                result.filename,
                result.filesize,
                result.warnings.len() as u32,
            ),
            Err(e) => LanzouResult::error(4, e.kind(), format!("Resolve failed: {}", e)),
        }
    })
}

/// Resolve a link described by a query string and return JSON (blocking).
///
/// The query uses the HTTP handler's parameters: `url`, `pwd`, `more`,
/// `direct` and `debug`.
///
/// # Returns
///
/// A JSON string:
/// ```json
/// {"status": 200, "body": {"downloadUrl": "...", "filename": "...", "filesize": 0}}
/// ```
///
/// `location` is present for `direct` queries. The caller must free the
/// string with `lanzou_free_string`.
///
/// # Safety
///
/// - `query` must be NULL or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn lanzou_resolve_json(query: *const c_char) -> *mut c_char {
    let query = ApiQuery::from_query_string(&ptr_to_string(query).unwrap_or_default());

    let response = match runtime() {
        Ok(runtime) => runtime.block_on(async {
            match Lanzou::new() {
                Ok(client) => serde_json::to_value(api::handle(&client, &query).await),
                Err(e) => Ok(serde_json::json!({
                    "status": 500,
                    "body": { "error": "failed to build client", "details": e.to_string() }
                })),
            }
        }),
        Err(e) => Ok(serde_json::json!({
            "status": 500,
            "body": { "error": "failed to create runtime", "details": e.to_string() }
        })),
    };

    let json = response.map(|v| v.to_string()).unwrap_or_else(|e| {
        serde_json::json!({ "status": 500, "body": { "error": e.to_string() } }).to_string()
    });

    string_to_ptr(json)
}

/// Free a LanzouResult structure.
///
/// # Safety
///
/// - `result` must be a valid LanzouResult previously returned by `lanzou_resolve`
/// - Each result must only be freed once
#[no_mangle]
pub unsafe extern "C" fn lanzou_free_result(result: LanzouResult) {
    for s in [
        result.error_message,
        result.error_kind,
        result.download_url,
        result.filename,
    ] {
        if !s.is_null() {
            let _ = CString::from_raw(s);
        }
    }
}

/// Free a string returned by lanzou-resolver FFI functions.
///
/// # Safety
///
/// - `s` must be NULL or a valid pointer previously returned by lanzou-resolver
/// - Each string must only be freed once
#[no_mangle]
pub unsafe extern "C" fn lanzou_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Get the library version.
///
/// # Returns
///
/// A static string with the version number. Do NOT free this string.
#[no_mangle]
pub extern "C" fn lanzou_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
