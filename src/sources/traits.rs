use async_trait::async_trait;

use crate::error::{FetchError, OverrideChannelError};
use crate::models::{ChatReply, ChatRequest, ResultPage};
use crate::query::QueryParams;

/// Remote listing backend
/// Anything that can answer one page query: the HTTP API, or a fake in tests
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one page of listings
    async fn fetch_page(&self, params: &QueryParams) -> Result<ResultPage, FetchError>;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}

/// Natural-language search backend feeding the assistant channel
#[async_trait]
pub trait ChatSource: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, OverrideChannelError>;
}
