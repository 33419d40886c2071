//! Client core for the football events mini-program.
//!
//! # Overview
//! `ApiClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. `Requester` runs those requests through a
//! pluggable `Transport`, drives the host's loading mask and toasts, and
//! unwraps the `{code, message, data}` envelope. Services, components and
//! screens sit on top.
//!
//! # Design
//! - Host facilities (toasts, navigation, login, album) are traits in
//!   [`host`] so everything above the transport is testable without a device.
//! - Local persistence goes through the [`storage::Storage`] trait; the
//!   session is the only writer.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod components;
pub mod config;
pub mod debounce;
pub mod error;
pub mod format;
pub mod host;
pub mod http;
pub mod markdown;
pub mod request;
pub mod screens;
pub mod services;
pub mod session;
pub mod storage;
pub mod types;
pub mod validate;

pub use client::{unwrap_envelope, ApiClient};
pub use config::ClientConfig;
pub use error::{ApiError, StorageError, ValidationError};
pub use host::{Feedback, Modal, Platform, PlatformError, Toast};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{CallOptions, ReqwestTransport, Requester, Transport, TransportError};
pub use services::Services;
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use types::{
    Banner, CustomerServiceConfig, Envelope, Event, EventListQuery, LoginRequest, PaginatedList,
    User, UserProfile,
};
