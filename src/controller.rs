use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::filters::{FilterSet, FilterUpdate};
use crate::models::Property;
use crate::scroll::ScrollPosition;
use crate::session::{Completion, FetchTicket, SearchSession, SessionView};
use crate::sources::ListingSource;

pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 400.0;

/// Drives a [`SearchSession`] against a [`ListingSource`].
///
/// The session lock is released while a page is on the wire, so a caller
/// that fires again during the fetch sees it in flight, and a filter change
/// made meanwhile turns the older response stale.
pub struct SearchController<S: ?Sized> {
    session: Arc<Mutex<SearchSession>>,
    source: Arc<S>,
    scroll_threshold: f64,
}

impl<S: ?Sized> Clone for SearchController<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            source: Arc::clone(&self.source),
            scroll_threshold: self.scroll_threshold,
        }
    }
}

impl<S: ListingSource + ?Sized> SearchController<S> {
    pub fn new(session: SearchSession, source: Arc<S>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            source,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD_PX,
        }
    }

    pub fn with_scroll_threshold(mut self, threshold_px: f64) -> Self {
        self.scroll_threshold = threshold_px;
        self
    }

    /// Load the first page for the initial filters.
    pub async fn start(&self) -> Option<Completion> {
        let ticket = self.session.lock().await.start();
        self.run(ticket).await
    }

    pub async fn update_filters(&self, update: FilterUpdate) -> Option<Completion> {
        let ticket = self.session.lock().await.update_filters(update);
        self.run(ticket).await
    }

    /// Apply `update` and return once the session has moved on; the fetch
    /// finishes on its own task.
    ///
    /// `None` when the update changed nothing.
    pub async fn submit_filters(&self, update: FilterUpdate) -> Option<JoinHandle<Completion>>
    where
        S: 'static,
    {
        let ticket = self.session.lock().await.update_filters(update)?;
        let controller = self.clone();
        Some(tokio::spawn(async move { controller.finish(ticket).await }))
    }

    pub async fn reset_filters(&self) -> Option<Completion> {
        let ticket = self.session.lock().await.reset_filters();
        self.run(ticket).await
    }

    /// `None` while a first page is already in flight.
    pub async fn refetch(&self) -> Option<Completion> {
        let ticket = self.session.lock().await.refetch();
        self.run(ticket).await
    }

    /// `None` when there is nothing more to load or a page is already in flight.
    pub async fn fetch_next_page(&self) -> Option<Completion> {
        let ticket = self.session.lock().await.request_next_page();
        self.run(ticket).await
    }

    /// Fetch the next page once the list is scrolled close enough to its end.
    pub async fn on_scroll(&self, position: ScrollPosition) -> Option<Completion> {
        if !position.near_end(self.scroll_threshold) {
            return None;
        }
        self.fetch_next_page().await
    }

    pub async fn apply_override(&self, items: Vec<Property>) {
        self.session.lock().await.apply_override(items);
    }

    pub async fn filters(&self) -> Arc<FilterSet> {
        self.session.lock().await.filters()
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    async fn run(&self, ticket: Option<FetchTicket>) -> Option<Completion> {
        Some(self.finish(ticket?).await)
    }

    async fn finish(&self, ticket: FetchTicket) -> Completion {
        debug!(
            "{} page {} for key {}",
            self.source.source_name(),
            ticket.page,
            ticket.key
        );
        let outcome = self.source.fetch_page(&ticket.params).await;
        self.session.lock().await.complete(ticket, outcome)
    }
}
