//! Screen state machines.
//!
//! # Design
//! A screen owns its UI state and the services it needs; nothing else
//! mutates it. Fetches issued together run concurrently on one task and each
//! result only touches its own slice of state, so completion order does not
//! matter. Every failure needs an explicit retry or pull-to-refresh.

mod detail;
mod home;
mod profile;
mod search;

pub use detail::{DetailContent, DetailView, EventDetailScreen, INVALID_EVENT_ID};
pub use home::HomeScreen;
pub use profile::{AuthState, ProfileScreen};
pub use search::SearchScreen;

use crate::error::ApiError;
use crate::types::{Event, PaginatedList};

pub const LOAD_FAILED: &str = "load failed";

/// What an event list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Error(&'a str),
    /// `searching` is set when a keyword produced no results.
    Empty { searching: bool },
    Populated(&'a [Event]),
}

/// Message shown in the error state of a screen.
pub(crate) fn load_error_message(e: &ApiError) -> String {
    match e {
        ApiError::Business { message, .. } | ApiError::HttpStatus { message, .. }
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => LOAD_FAILED.to_string(),
    }
}

/// Event list slice shared by the home and search screens.
#[derive(Debug)]
pub(crate) struct EventList {
    events: Vec<Event>,
    loading: bool,
    error: Option<String>,
    is_empty: bool,
}

/// A fresh list reads as loading until the first page arrives.
impl Default for EventList {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            loading: true,
            error: None,
            is_empty: false,
        }
    }
}

impl EventList {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn apply(&mut self, result: Result<PaginatedList<Event>, ApiError>) {
        match result {
            Ok(page) => {
                self.is_empty = page.items.is_empty();
                self.events = page.items;
            }
            Err(e) => {
                self.error = Some(load_error_message(&e));
                self.events.clear();
            }
        }
        self.loading = false;
    }

    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn view(&self, searching: bool) -> ListView<'_> {
        if self.loading && self.events.is_empty() {
            ListView::Loading
        } else if let Some(error) = &self.error {
            ListView::Error(error)
        } else if self.is_empty {
            ListView::Empty { searching }
        } else {
            ListView::Populated(&self.events)
        }
    }
}
