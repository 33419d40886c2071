//! Error types for the events API client.
//!
//! # Design
//! The variants follow the failure taxonomy a screen branches on: transport
//! (timeout vs. everything else), transport status (non-2xx), business
//! (envelope `code != 200`), client-side validation and platform permission
//! denials. `notice()` picks the short text shown to the user.

use thiserror::Error;

/// Fallback message for a business failure whose envelope carries none.
pub const DEFAULT_BUSINESS_MESSAGE: &str = "request failed";

pub const NOTICE_TIMEOUT: &str = "request timed out";
pub const NOTICE_NETWORK: &str = "network connection failed";
pub const NOTICE_FALLBACK: &str = "network request failed";

/// Errors returned by `ApiClient` parse methods, the `Requester` and services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection refused, DNS failure or any other transport problem.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The envelope carried a business code other than 200.
    #[error("{message}")]
    Business { code: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Input rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The host platform declined a permission (profile sharing, album...).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Text for the transient notice shown when this error surfaces.
    pub fn notice(&self) -> String {
        match self {
            ApiError::Timeout => NOTICE_TIMEOUT.to_string(),
            ApiError::Transport(_) => NOTICE_NETWORK.to_string(),
            ApiError::HttpStatus { message, .. } | ApiError::Business { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            ApiError::Validation(e) => e.to_string(),
            _ => NOTICE_FALLBACK.to_string(),
        }
    }

    /// Whether a failure toast should be suppressed for this error.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ApiError::PermissionDenied(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::HttpStatus { status: 404, .. } | ApiError::Business { code: 404, .. }
        )
    }
}

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("nickname cannot be empty")]
    EmptyNickname,

    #[error("nickname cannot exceed {max} characters")]
    NicknameTooLong { max: usize },
}

/// Local device storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(String),

    #[error("storage encoding failed: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_selection() {
        assert_eq!(ApiError::Timeout.notice(), "request timed out");
        assert_eq!(
            ApiError::Transport("connection refused".into()).notice(),
            "network connection failed"
        );
        assert_eq!(
            ApiError::Business { code: 400, message: "bad keyword".into() }.notice(),
            "bad keyword"
        );
        assert_eq!(
            ApiError::HttpStatus { status: 502, message: String::new() }.notice(),
            "network request failed"
        );
        assert_eq!(
            ApiError::Deserialization("eof".into()).notice(),
            "network request failed"
        );
        assert_eq!(
            ApiError::from(ValidationError::NicknameTooLong { max: 20 }).notice(),
            "nickname cannot exceed 20 characters"
        );
    }

    #[test]
    fn not_found_covers_status_and_business() {
        assert!(ApiError::HttpStatus { status: 404, message: "x".into() }.is_not_found());
        assert!(ApiError::Business { code: 404, message: "x".into() }.is_not_found());
        assert!(!ApiError::Timeout.is_not_found());
    }
}
