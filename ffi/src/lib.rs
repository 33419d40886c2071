//! C-ABI wrapper around `matchday-core`.
//!
//! # Overview
//! Lets a host written in any language with a C FFI build the backend
//! requests, unwrap response envelopes, render event markdown and validate
//! nicknames, while doing the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `mdy_build_*` per backend operation; a single `mdy_parse_envelope`
//!   serves every response because payloads come back as JSON.
//! - The C caller owns all returned pointers and must call the matching
//!   `mdy_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use matchday_core::http::HttpResponse;
use matchday_core::types::{EventListQuery, LoginRequest};
use matchday_core::{markdown, unwrap_envelope, validate};

use types::*;

/// Borrow a C string argument. Null and non-UTF-8 input read as `None`.
fn arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn client_ref<'a>(client: *const FfiClient) -> Option<&'a FfiClient> {
    if client.is_null() {
        None
    } else {
        Some(unsafe { &*client })
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `mdy_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| match arg(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiClient {
            inner: matchday_core::ApiClient::new(url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `mdy_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// `GET /api/events`. `keyword` may be null; blank keywords are omitted.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_list_events(
    client: *const FfiClient,
    page: u32,
    page_size: u32,
    keyword: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(client) = client_ref(client) else {
            return std::ptr::null_mut();
        };
        let mut query = EventListQuery {
            page,
            page_size,
            keyword: None,
        };
        if let Some(keyword) = arg(keyword) {
            query = query.with_keyword(keyword);
        }
        FfiHttpRequest::from_core(client.inner.build_list_events(&query))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `GET /api/events/{id}`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_get_event(client: *const FfiClient, id: i64) -> *mut FfiHttpRequest {
    catch_unwind(|| match client_ref(client) {
        Some(client) => FfiHttpRequest::from_core(client.inner.build_get_event(id)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `POST /api/events/{id}/view`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_increment_view_count(
    client: *const FfiClient,
    id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| match client_ref(client) {
        Some(client) => FfiHttpRequest::from_core(client.inner.build_increment_view_count(id)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `GET /api/banners?is_active=true`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_list_banners(client: *const FfiClient) -> *mut FfiHttpRequest {
    catch_unwind(|| match client_ref(client) {
        Some(client) => FfiHttpRequest::from_core(client.inner.build_list_banners()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `GET /api/config/customer-service`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_customer_service(client: *const FfiClient) -> *mut FfiHttpRequest {
    catch_unwind(|| match client_ref(client) {
        Some(client) => FfiHttpRequest::from_core(client.inner.build_customer_service()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `POST /api/auth/login`. `nick_name` and `avatar_url` may be null.
///
/// Returns null if `client` or `code` is null.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_login(
    client: *const FfiClient,
    code: *const c_char,
    nick_name: *const c_char,
    avatar_url: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(client), Some(code)) = (client_ref(client), arg(code)) else {
            return std::ptr::null_mut();
        };
        let input = LoginRequest {
            code: code.to_string(),
            nick_name: arg(nick_name).map(str::to_string),
            avatar_url: arg(avatar_url).map(str::to_string),
        };
        match client.inner.build_login(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `GET /api/auth/user?open_id=`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_get_user(
    client: *const FfiClient,
    open_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| match (client_ref(client), arg(open_id)) {
        (Some(client), Some(open_id)) => {
            FfiHttpRequest::from_core(client.inner.build_get_user(open_id))
        }
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// `PUT /api/auth/user/nickname`. Validate with `mdy_validate_nickname`
/// first; this only encodes what it is given.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_build_update_nickname(
    client: *const FfiClient,
    open_id: *const c_char,
    nick_name: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| match (client_ref(client), arg(open_id), arg(nick_name)) {
        (Some(client), Some(open_id), Some(nick_name)) => {
            FfiHttpRequest::from_core(client.inner.build_update_nickname(open_id, nick_name))
        }
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse and helpers
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: arg(resp.body).unwrap_or_default().to_string(),
    }
}

/// Unwrap the `{code, message, data}` envelope of any response.
///
/// On success `data_json` holds `data` re-serialized as JSON.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_parse_envelope(response: *const FfiHttpResponse) -> *mut FfiResult {
    catch_unwind(|| {
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        match unwrap_envelope::<serde_json::Value>(ffi_response_to_core(resp)) {
            Ok(data) => FfiResult::ok_json(data.to_string()),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in mdy_parse_envelope"))
}

/// Trim and check a nickname. On success `data_json` is the trimmed name as
/// a JSON string; on failure `error_code` is `Validation`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_validate_nickname(raw: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let Some(raw) = arg(raw) else {
            return FfiResult::null_arg("raw");
        };
        match validate::validate_nickname(raw) {
            Ok(name) => FfiResult::ok_json(serde_json::Value::String(name).to_string()),
            Err(e) => FfiResult::from_error(e.into()),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in mdy_validate_nickname"))
}

/// Render event markdown to display HTML. Returns null on null input.
/// Free the result with `mdy_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_render_markdown(
    source: *const c_char,
    base_url: *const c_char,
) -> *mut c_char {
    catch_unwind(|| match (arg(source), arg(base_url)) {
        (Some(source), Some(base_url)) => into_c_string(markdown::render(source, base_url)),
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Resolve a backend asset path against `base_url`. Returns null on null input.
/// Free the result with `mdy_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_resolve_asset_url(
    base_url: *const c_char,
    path: *const c_char,
) -> *mut c_char {
    catch_unwind(|| match (arg(base_url), arg(path)) {
        (Some(base_url), Some(path)) => {
            into_c_string(markdown::resolve_asset_url(base_url, path))
        }
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free a request returned by any `mdy_build_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a result returned by `mdy_parse_envelope` or `mdy_validate_nickname`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data_json);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mdy_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
