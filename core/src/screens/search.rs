use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::{EventList, ListView};
use crate::components::{EventCard, SearchBar};
use crate::host::Feedback;
use crate::services::EventService;
use crate::types::EventListQuery;

pub const EMPTY_NO_EVENTS: &str = "No events yet";
pub const EMPTY_NO_MATCHES: &str = "No matching events";

/// Keyword search over the event list.
///
/// Keystrokes reach the screen already debounced by a `SearchBar`; clear,
/// retry and pull-to-refresh fetch at once with the committed keyword.
pub struct SearchScreen {
    events: EventService,
    feedback: Arc<dyn Feedback>,
    base_url: String,
    page_size: u32,
    keyword: String,
    list: EventList,
}

impl SearchScreen {
    pub fn new(
        events: EventService,
        feedback: Arc<dyn Feedback>,
        base_url: &str,
        page_size: u32,
    ) -> Self {
        Self {
            events,
            feedback,
            base_url: base_url.to_string(),
            page_size,
            keyword: String::new(),
            list: EventList::default(),
        }
    }

    /// A `SearchBar` whose debounced keywords arrive on the returned channel;
    /// feed them to [`SearchScreen::drain_searches`].
    pub fn search_bar(delay: Duration) -> (SearchBar, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bar = SearchBar::with_debounce(
            delay,
            Arc::new(move |keyword: String| {
                let _ = tx.send(keyword);
            }),
        );
        (bar, rx)
    }

    async fn fetch(&mut self) {
        self.list.begin();
        let query = EventListQuery::first_page(self.page_size).with_keyword(&self.keyword);
        let result = self.events.list_events(&query).await;
        self.list.apply(result);
    }

    pub async fn load(&mut self) {
        self.fetch().await;
    }

    pub async fn on_search(&mut self, keyword: &str) {
        debug!(keyword, "search");
        self.keyword = keyword.to_string();
        self.fetch().await;
    }

    pub async fn on_clear(&mut self) {
        self.keyword.clear();
        self.fetch().await;
    }

    pub async fn retry(&mut self) {
        self.fetch().await;
    }

    pub async fn on_pull_down_refresh(&mut self) {
        self.fetch().await;
        self.feedback.stop_pull_down_refresh();
    }

    /// Run the newest keyword queued by a search bar; older queued keywords
    /// are superseded. Returns whether a search ran.
    pub async fn drain_searches(&mut self, searches: &mut mpsc::UnboundedReceiver<String>) -> bool {
        let mut latest = None;
        while let Ok(keyword) = searches.try_recv() {
            latest = Some(keyword);
        }
        match latest {
            Some(keyword) => {
                self.on_search(&keyword).await;
                true
            }
            None => false,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn view(&self) -> ListView<'_> {
        self.list.view(!self.keyword.is_empty())
    }

    pub fn empty_message(&self) -> &'static str {
        if self.keyword.is_empty() {
            EMPTY_NO_EVENTS
        } else {
            EMPTY_NO_MATCHES
        }
    }

    pub fn cards(&self) -> Vec<EventCard> {
        self.list
            .events()
            .iter()
            .map(|e| EventCard::from_event(e, &self.base_url))
            .collect()
    }
}
