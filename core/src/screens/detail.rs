use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::load_error_message;
use crate::format;
use crate::markdown::{self, resolve_asset_url};
use crate::services::{ConfigService, EventService};
use crate::types::{CustomerServiceConfig, Event};

pub const INVALID_EVENT_ID: &str = "invalid event id";

/// Everything the detail page renders once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub title: String,
    pub published_at: String,
    pub views: String,
    pub body_html: String,
    pub qr_code_url: String,
    pub online_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView<'a> {
    /// Nothing requested yet.
    Idle,
    Loading,
    Error(&'a str),
    Content(DetailContent),
}

pub struct EventDetailScreen {
    events: EventService,
    config: ConfigService,
    base_url: String,
    requested: Option<i64>,
    event: Option<Event>,
    customer_service: Option<CustomerServiceConfig>,
    loading: bool,
    error: Option<String>,
    view_increment: Option<JoinHandle<()>>,
}

impl EventDetailScreen {
    pub fn new(events: EventService, config: ConfigService, base_url: &str) -> Self {
        Self {
            events,
            config,
            base_url: base_url.to_string(),
            requested: None,
            event: None,
            customer_service: None,
            loading: false,
            error: None,
            view_increment: None,
        }
    }

    /// Mount with the raw `id` route parameter.
    pub async fn load_from_route(&mut self, id: Option<&str>) {
        match id.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            Some(id) if id > 0 => self.load(id).await,
            _ => {
                warn!(?id, "detail opened without a usable id");
                self.event = None;
                self.loading = false;
                self.error = Some(INVALID_EVENT_ID.to_string());
            }
        }
    }

    /// Fetch the event and the customer-service config together; either
    /// failing fails the page. On success the view increment is fired and
    /// not awaited.
    pub async fn load(&mut self, id: i64) {
        self.requested = Some(id);
        self.loading = true;
        self.error = None;
        let result = tokio::try_join!(self.events.get_event(id), self.config.customer_service());
        match result {
            Ok((event, config)) => {
                debug!(event_id = id, "detail loaded");
                self.event = Some(event);
                self.customer_service = Some(config);
                self.view_increment = Some(self.events.spawn_view_increment(id));
            }
            Err(e) => self.error = Some(load_error_message(&e)),
        }
        self.loading = false;
    }

    /// Reload the last requested event. A page opened with a bad id stays
    /// in its error state.
    pub async fn retry(&mut self) {
        if let Some(id) = self.requested {
            self.load(id).await;
        }
    }

    /// Handle of the background view increment, if one was started.
    pub fn take_view_increment(&mut self) -> Option<JoinHandle<()>> {
        self.view_increment.take()
    }

    pub fn view(&self) -> DetailView<'_> {
        if self.loading {
            return DetailView::Loading;
        }
        if let Some(error) = &self.error {
            return DetailView::Error(error);
        }
        let (Some(event), Some(config)) = (&self.event, &self.customer_service) else {
            return DetailView::Idle;
        };
        DetailView::Content(DetailContent {
            title: event.title.clone(),
            published_at: format::publish_time(event.created_at),
            views: format::view_count_label(event.view_count),
            body_html: markdown::render(event.content.as_deref().unwrap_or_default(), &self.base_url),
            qr_code_url: resolve_asset_url(&self.base_url, &config.qr_code_url),
            online_time: config.online_time.clone(),
        })
    }
}
