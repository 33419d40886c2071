//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` field by field. Results do not
//! mirror every DTO: successful payloads travel as the envelope's `data`
//! serialized to a JSON C string, so one result type serves every endpoint.

use std::ffi::CString;
use std::os::raw::c_char;

use matchday_core::error::ApiError;
use matchday_core::http::HttpMethod;

/// Opaque handle to an `ApiClient`. C callers receive a pointer to this
/// and pass it back into every `mdy_build_*` function.
pub struct FfiClient {
    pub(crate) inner: matchday_core::ApiClient,
}

/// Heap C string from a Rust string. Interior NULs are dropped rather than
/// failing the call.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `path` is the absolute URL. `body` is null for requests without one.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: matchday_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: into_c_string(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The C caller fills this after executing a request. The FFI layer reads
/// but does not free these fields; a null `body` reads as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Timeout = 1,
    Transport = 2,
    HttpStatus = 3,
    Business = 4,
    Deserialization = 5,
    Serialization = 6,
    Validation = 7,
    PermissionDenied = 8,
    Storage = 9,
    Panic = 10,
    NullArg = 11,
}

/// Result of `mdy_parse_envelope` and `mdy_validate_nickname`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data_json`
/// holds the payload as JSON. On failure `data_json` is null; `http_status`
/// and `business_code` are set for the matching error codes, 0 otherwise.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub business_code: i64,
    pub data_json: *mut c_char,
}

impl FfiResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    pub(crate) fn ok_json(json: String) -> *mut Self {
        FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            business_code: 0,
            data_json: into_c_string(json),
        }
        .boxed()
    }

    fn error(error_code: FfiErrorCode, message: String) -> Self {
        FfiResult {
            error_code,
            error_message: into_c_string(message),
            http_status: 0,
            business_code: 0,
            data_json: std::ptr::null_mut(),
        }
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let message = err.to_string();
        let result = match &err {
            ApiError::Timeout => Self::error(FfiErrorCode::Timeout, message),
            ApiError::Transport(_) => Self::error(FfiErrorCode::Transport, message),
            ApiError::HttpStatus { status, .. } => FfiResult {
                http_status: *status,
                ..Self::error(FfiErrorCode::HttpStatus, message)
            },
            ApiError::Business { code, .. } => FfiResult {
                business_code: *code,
                ..Self::error(FfiErrorCode::Business, message)
            },
            ApiError::Deserialization(_) => Self::error(FfiErrorCode::Deserialization, message),
            ApiError::Serialization(_) => Self::error(FfiErrorCode::Serialization, message),
            ApiError::Validation(_) => Self::error(FfiErrorCode::Validation, message),
            ApiError::PermissionDenied(_) => Self::error(FfiErrorCode::PermissionDenied, message),
            ApiError::Storage(_) => Self::error(FfiErrorCode::Storage, message),
        };
        result.boxed()
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}")).boxed()
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string()).boxed()
    }
}
