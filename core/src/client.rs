//! Stateless HTTP request builder and response parser for the events API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each backend operation has a `build_*` method producing an
//! `HttpRequest`; every response goes through [`unwrap_envelope`], which maps
//! transport status and business codes to `ApiError` and hands back `data`.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, DEFAULT_BUSINESS_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryParams};
use crate::types::{
    Banner, CustomerServiceConfig, Envelope, Event, EventListQuery, LoginRequest, PaginatedList,
    User, SUCCESS_CODE,
};

/// Synchronous, stateless client for the events API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    pub fn build_list_events(&self, query: &EventListQuery) -> HttpRequest {
        let keyword = query.keyword.as_deref().filter(|k| !k.is_empty());
        let path = QueryParams::new()
            .push("page", Some(query.page))
            .push("page_size", Some(query.page_size))
            .push("keyword", keyword)
            .append_to("/api/events");
        self.request(HttpMethod::Get, &path, None)
    }

    pub fn build_get_event(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/api/events/{id}"), None)
    }

    pub fn build_increment_view_count(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("/api/events/{id}/view"), None)
    }

    pub fn build_list_banners(&self) -> HttpRequest {
        let path = QueryParams::new()
            .push("is_active", Some(true))
            .append_to("/api/banners");
        self.request(HttpMethod::Get, &path, None)
    }

    pub fn build_customer_service(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/config/customer-service", None)
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, "/api/auth/login", Some(body)))
    }

    pub fn build_get_user(&self, open_id: &str) -> HttpRequest {
        let path = QueryParams::new()
            .push("open_id", Some(open_id))
            .append_to("/api/auth/user");
        self.request(HttpMethod::Get, &path, None)
    }

    /// Both arguments travel in the query string; the body stays empty.
    pub fn build_update_nickname(&self, open_id: &str, nick_name: &str) -> HttpRequest {
        let path = QueryParams::new()
            .push("open_id", Some(open_id))
            .push("nick_name", Some(nick_name))
            .append_to("/api/auth/user/nickname");
        self.request(HttpMethod::Put, &path, None)
    }

    pub fn parse_list_events(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedList<Event>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_event(&self, response: HttpResponse) -> Result<Event, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_banners(&self, response: HttpResponse) -> Result<Vec<Banner>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_customer_service(
        &self,
        response: HttpResponse,
    ) -> Result<CustomerServiceConfig, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        unwrap_envelope(response)
    }
}

/// Unwrap the `{code, message, data}` envelope of a response.
pub fn unwrap_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    // `data` stays untyped until the code says it is a success payload.
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    if envelope.code != SUCCESS_CODE {
        let message = if envelope.message.is_empty() {
            DEFAULT_BUSINESS_MESSAGE.to_string()
        } else {
            envelope.message
        };
        return Err(ApiError::Business {
            code: envelope.code,
            message,
        });
    }
    serde_json::from_value(envelope.data.unwrap_or(serde_json::Value::Null))
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx statuses to `ApiError::HttpStatus`, keeping the envelope
/// message when the error body carries one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&response.body)
        .map(|env| env.message)
        .unwrap_or_else(|_| response.body.clone());
    Err(ApiError::HttpStatus {
        status: response.status,
        message,
    })
}
