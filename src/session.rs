//! Paginated fetch state for one browsing session.
//!
//! `SearchSession` performs no I/O. Every operation that needs the network
//! hands back a [`FetchTicket`]; the caller runs the fetch and feeds the
//! outcome to [`SearchSession::complete`]. Tickets carry the session key they
//! were issued under, so a response that arrives after the filters changed is
//! recognised and dropped.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::AggregatedResultSet;
use crate::error::FetchError;
use crate::filters::{FilterSet, FilterStore, FilterUpdate};
use crate::models::{Property, ResultPage};
use crate::query::{QueryMapper, QueryParams};

const NEXT_PAGE_NOTICE: &str = "Couldn't load more results. Scroll to try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchStatus {
    Idle,
    LoadingFirstPage,
    Ready,
    LoadingNextPage,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    FirstPage,
    NextPage,
}

/// Where the visible results came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultOrigin {
    Filters,
    Assistant,
}

/// A fetch the caller must perform on behalf of the session
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub key: u64,
    pub kind: FetchKind,
    pub page: u32,
    pub filters: Arc<FilterSet>,
    pub params: QueryParams,
}

/// What happened to a fetch outcome handed back to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied,
    /// Issued under an older key; discarded
    Stale,
    Failed(FetchError),
}

/// Read model for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: FetchStatus,
    pub origin: ResultOrigin,
    pub items: Vec<Property>,
    pub total_count: u64,
    pub pages_loaded: usize,
    pub has_next_page: bool,
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug)]
pub struct SearchSession {
    filters: FilterStore,
    mapper: QueryMapper,
    key: u64,
    status: FetchStatus,
    origin: ResultOrigin,
    results: AggregatedResultSet,
    error: Option<FetchError>,
    notice: Option<String>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(QueryMapper::default())
    }
}

impl SearchSession {
    pub fn new(mapper: QueryMapper) -> Self {
        Self::with_filters(mapper, FilterSet::default())
    }

    pub fn with_filters(mapper: QueryMapper, filters: FilterSet) -> Self {
        Self {
            filters: FilterStore::with_filters(filters),
            mapper,
            key: 0,
            status: FetchStatus::Idle,
            origin: ResultOrigin::Filters,
            results: AggregatedResultSet::new(),
            error: None,
            notice: None,
        }
    }

    pub fn filters(&self) -> Arc<FilterSet> {
        self.filters.snapshot()
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn origin(&self) -> ResultOrigin {
        self.origin
    }

    pub fn results(&self) -> &AggregatedResultSet {
        &self.results
    }

    /// First load on mount. Only valid from `Idle`.
    pub fn start(&mut self) -> Option<FetchTicket> {
        if self.status != FetchStatus::Idle {
            return None;
        }
        Some(self.begin_first_page(true))
    }

    /// Merge `update` into the filters; a real change starts a fresh session.
    pub fn update_filters(&mut self, update: FilterUpdate) -> Option<FetchTicket> {
        if !self.filters.update(update) {
            return None;
        }
        Some(self.begin_first_page(true))
    }

    /// "Clear filters"
    pub fn reset_filters(&mut self) -> Option<FetchTicket> {
        if !self.filters.reset() {
            return None;
        }
        Some(self.begin_first_page(true))
    }

    /// Re-issue the first page under the current filters.
    ///
    /// Results already on screen stay visible until the new first page lands.
    /// Ignored while a first page is already in flight.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        if self.status == FetchStatus::LoadingFirstPage {
            debug!("Refetch ignored while the first page loads");
            return None;
        }
        Some(self.begin_first_page(false))
    }

    /// Next page, if there is one and no page fetch is outstanding.
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        let retry_after_failure = self.status == FetchStatus::Error && !self.results.is_empty();
        if self.status != FetchStatus::Ready && !retry_after_failure {
            debug!("Next page ignored while {:?}", self.status);
            return None;
        }
        if self.origin != ResultOrigin::Filters || !self.results.has_next_page() {
            return None;
        }

        let page = self.results.pages_loaded() as u32;
        let filters = self.filters.snapshot();
        let params = self.mapper.map_now(&filters, page);
        self.status = FetchStatus::LoadingNextPage;
        debug!("Requesting page {} (key {})", page, self.key);
        Some(FetchTicket {
            key: self.key,
            kind: FetchKind::NextPage,
            page,
            filters,
            params,
        })
    }

    /// Feed the outcome of a ticket back into the session.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ResultPage, FetchError>,
    ) -> Completion {
        let expected = match ticket.kind {
            FetchKind::FirstPage => FetchStatus::LoadingFirstPage,
            FetchKind::NextPage => FetchStatus::LoadingNextPage,
        };
        if ticket.key != self.key || self.status != expected {
            debug!(
                "Discarding stale page {} (key {}, current key {})",
                ticket.page, ticket.key, self.key
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(page) => {
                if ticket.kind == FetchKind::FirstPage {
                    self.results.clear();
                    self.origin = ResultOrigin::Filters;
                }
                self.results.append(page);
                self.status = FetchStatus::Ready;
                self.error = None;
                self.notice = None;
                info!(
                    "Loaded page {}: {} of {} listings",
                    ticket.page,
                    self.results.len(),
                    self.results.total_count()
                );
                Completion::Applied
            }
            Err(err) => {
                self.status = FetchStatus::Error;
                if ticket.kind == FetchKind::NextPage {
                    warn!("Page {} failed, keeping earlier pages: {}", ticket.page, err);
                    self.notice = Some(NEXT_PAGE_NOTICE.to_string());
                } else {
                    warn!("First page failed: {}", err);
                }
                self.error = Some(err.clone());
                Completion::Failed(err)
            }
        }
    }

    /// Install an externally resolved result list, bypassing pagination.
    ///
    /// The filters are left as they are; any fetch still in flight becomes
    /// stale.
    pub fn apply_override(&mut self, items: Vec<Property>) {
        self.key += 1;
        self.results.replace(items);
        self.origin = ResultOrigin::Assistant;
        self.status = FetchStatus::Ready;
        self.error = None;
        self.notice = None;
        info!("Results overridden with {} listings", self.results.len());
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.status,
            origin: self.origin,
            items: self.results.items().cloned().collect(),
            total_count: self.results.total_count(),
            pages_loaded: self.results.pages_loaded(),
            has_next_page: self.results.has_next_page(),
            is_loading: self.status == FetchStatus::LoadingFirstPage && self.results.is_empty(),
            is_fetching_next_page: self.status == FetchStatus::LoadingNextPage,
            is_error: self.status == FetchStatus::Error,
            error: self.error.as_ref().map(ToString::to_string),
            notice: self.notice.clone(),
        }
    }

    fn begin_first_page(&mut self, discard_results: bool) -> FetchTicket {
        self.key += 1;
        if discard_results {
            self.results.clear();
            self.origin = ResultOrigin::Filters;
        }
        self.status = FetchStatus::LoadingFirstPage;
        self.error = None;
        self.notice = None;

        let filters = self.filters.snapshot();
        let params = self.mapper.map_now(&filters, 0);
        debug!("Starting filter session {}", self.key);
        FetchTicket {
            key: self.key,
            kind: FetchKind::FirstPage,
            page: 0,
            filters,
            params,
        }
    }
}
