use std::sync::Arc;

use tracing::{debug, warn};

use super::{EventList, ListView};
use crate::components::EventCard;
use crate::host::Feedback;
use crate::markdown::resolve_asset_url;
use crate::services::{BannerService, EventService};
use crate::types::{Banner, EventListQuery};

/// Banner carousel plus the latest events.
pub struct HomeScreen {
    events: EventService,
    banners_service: BannerService,
    feedback: Arc<dyn Feedback>,
    base_url: String,
    page_size: u32,
    banners: Vec<Banner>,
    list: EventList,
}

impl HomeScreen {
    pub fn new(
        events: EventService,
        banners_service: BannerService,
        feedback: Arc<dyn Feedback>,
        base_url: &str,
        page_size: u32,
    ) -> Self {
        Self {
            events,
            banners_service,
            feedback,
            base_url: base_url.to_string(),
            page_size,
            banners: Vec::new(),
            list: EventList::default(),
        }
    }

    /// Mount: banners and events load concurrently. A banner failure leaves
    /// the carousel as it was; only an event failure shows the error state.
    pub async fn load(&mut self) {
        self.list.begin();
        let query = EventListQuery::first_page(self.page_size);
        let (banners, events) = tokio::join!(
            self.banners_service.list_banners(),
            self.events.list_events(&query)
        );
        match banners {
            Ok(banners) => self.banners = banners,
            Err(e) => warn!(error = %e, "banner load failed"),
        }
        self.list.apply(events);
    }

    /// Tap-to-retry in the error state reloads the events only.
    pub async fn retry(&mut self) {
        self.list.begin();
        let query = EventListQuery::first_page(self.page_size);
        let result = self.events.list_events(&query).await;
        self.list.apply(result);
    }

    pub async fn on_pull_down_refresh(&mut self) {
        debug!("home refresh");
        self.load().await;
        self.feedback.stop_pull_down_refresh();
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn banner_images(&self) -> Vec<String> {
        self.banners
            .iter()
            .map(|b| resolve_asset_url(&self.base_url, &b.image_url))
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn view(&self) -> ListView<'_> {
        self.list.view(false)
    }

    pub fn cards(&self) -> Vec<EventCard> {
        self.list
            .events()
            .iter()
            .map(|e| EventCard::from_event(e, &self.base_url))
            .collect()
    }
}
