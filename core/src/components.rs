//! Presentational components: their view data and local interaction.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::format;
use crate::host::{Feedback, Modal, Platform, PlatformError, Toast};
use crate::markdown::resolve_asset_url;
use crate::types::Event;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SEARCH_PLACEHOLDER: &str = "Search events";

/// View data for one event in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub id: i64,
    pub title: String,
    /// `None` renders the placeholder.
    pub cover_url: Option<String>,
    pub date: String,
    pub views: String,
}

impl EventCard {
    pub fn from_event(event: &Event, base_url: &str) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            cover_url: event
                .cover_image
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(|c| resolve_asset_url(base_url, c)),
            date: format::card_date(event.date),
            views: format::view_count(event.view_count),
        }
    }

    pub fn detail_route(&self) -> String {
        format!("/pages/event-detail/index?id={}", self.id)
    }

    pub fn open(&self, feedback: &dyn Feedback) {
        feedback.navigate_to(&self.detail_route());
    }
}

pub type SearchCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Search input with a debounced callback.
///
/// The displayed value always updates synchronously. Typing schedules the
/// callback after the quiet period; clearing fires it at once with `""`.
/// Dropping the bar cancels anything pending.
pub struct SearchBar {
    placeholder: String,
    value: String,
    debouncer: Debouncer,
    on_search: SearchCallback,
}

impl SearchBar {
    pub fn new(on_search: SearchCallback) -> Self {
        Self::with_debounce(DEFAULT_DEBOUNCE, on_search)
    }

    pub fn with_debounce(delay: Duration, on_search: SearchCallback) -> Self {
        Self {
            placeholder: DEFAULT_SEARCH_PLACEHOLDER.to_string(),
            value: String::new(),
            debouncer: Debouncer::new(delay),
            on_search,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The clear button only shows while there is text.
    pub fn shows_clear_button(&self) -> bool {
        !self.value.is_empty()
    }

    /// Sync the displayed value from the owner without searching.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn on_input(&mut self, text: &str) {
        self.value = text.to_string();
        let keyword = self.value.clone();
        let on_search = self.on_search.clone();
        self.debouncer.schedule(move || on_search(keyword));
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.debouncer.cancel();
        (self.on_search)(String::new());
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The user dismissed the save prompt.
    Declined,
    /// Album permission refused; `opened_settings` tells whether the user
    /// jumped to the system settings.
    PermissionDenied { opened_settings: bool },
    Failed,
}

/// Customer-service QR code dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCodeModal {
    qr_code_url: String,
    visible: bool,
}

impl QrCodeModal {
    pub fn new(qr_code_url: impl Into<String>) -> Self {
        Self {
            qr_code_url: qr_code_url.into(),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Mask tap. Taps on the content itself never reach here.
    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn image_url(&self, base_url: &str) -> String {
        resolve_asset_url(base_url, &self.qr_code_url)
    }

    /// Long-press flow: confirm, save to the album, report the result.
    pub async fn long_press_save(
        &self,
        base_url: &str,
        platform: &dyn Platform,
        feedback: &dyn Feedback,
    ) -> SaveOutcome {
        let prompt = Modal::new("Save QR code", "Save the QR code to your album?");
        if !platform.confirm(&prompt).await {
            return SaveOutcome::Declined;
        }
        let url = self.image_url(base_url);
        match platform.save_image_to_album(&url).await {
            Ok(()) => {
                debug!(%url, "qr code saved");
                feedback.show_toast(&Toast::success("saved"));
                SaveOutcome::Saved
            }
            Err(PlatformError::Denied(reason)) => {
                warn!(%reason, "album permission denied");
                let settings = Modal::new(
                    "Permission required",
                    "Allow album access in settings to save images",
                )
                .with_confirm_text("Open settings");
                let opened_settings = platform.confirm(&settings).await;
                if opened_settings {
                    platform.open_setting().await;
                }
                SaveOutcome::PermissionDenied { opened_settings }
            }
            Err(PlatformError::Failed(reason)) => {
                warn!(%reason, "saving qr code failed");
                feedback.show_toast(&Toast::info("save failed"));
                SaveOutcome::Failed
            }
        }
    }
}
