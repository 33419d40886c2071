//! Domain DTOs for the events API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Every
//! response is wrapped in an [`Envelope`] and only `data` reaches callers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Business code that marks a successful envelope.
pub const SUCCESS_CODE: i64 = 200;

/// `{code, message, data}` wrapper around every backend response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// A football event as listed on the home and search screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    /// Markdown body.
    #[serde(default)]
    pub content: Option<String>,
    /// Path relative to the backend origin, or an absolute URL.
    #[serde(default)]
    pub cover_image: Option<String>,
    pub view_count: u64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// An authenticated user. `open_id` is the durable identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub open_id: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_login_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerServiceConfig {
    pub id: i64,
    pub qr_code_url: String,
    pub online_time: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Banner {
    pub id: i64,
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One page of results. `page` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

/// Query for `GET /api/events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    pub page: u32,
    pub page_size: u32,
    pub keyword: Option<String>,
}

impl Default for EventListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            keyword: None,
        }
    }
}

impl EventListQuery {
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Attach a search keyword; empty or whitespace-only keywords are dropped.
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let keyword = keyword.trim();
        self.keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        self
    }
}

/// Request payload for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Profile details the host platform shares once the user consents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
}
