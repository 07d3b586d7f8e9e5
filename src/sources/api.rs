use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use crate::error::{FetchError, OverrideChannelError};
use crate::models::{ChatReply, ChatRequest, ResultPage};
use crate::query::QueryParams;
use crate::settings::ApiSettings;
use crate::sources::traits::{ChatSource, ListingSource};

/// HTTP client for the listing and chat endpoints
pub struct ApiClient {
    client: Client,
    listings_url: String,
    chat_url: String,
}

impl ApiClient {
    /// Create a new client for the configured API
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            listings_url: settings.listings_url(),
            chat_url: settings.chat_url(),
        })
    }
}

/// Status code and body of an unsuccessful response
async fn error_body(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}

#[async_trait]
impl ListingSource for ApiClient {
    async fn fetch_page(&self, params: &QueryParams) -> Result<ResultPage, FetchError> {
        debug!("Fetching {} (offset {})", self.listings_url, params.offset);

        let response = self
            .client
            .get(&self.listings_url)
            .query(&params.to_query_pairs())
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Listing API returned status: {}", response.status());
            let (status, body) = error_body(response).await;
            return Err(FetchError::Status { status, body });
        }

        let page: ResultPage = response.json().await?;
        info!(
            "Fetched {} listings at offset {} (total {})",
            page.projects.len(),
            params.offset,
            page.total_count
        );
        Ok(page)
    }

    fn source_name(&self) -> &'static str {
        "listing-api"
    }
}

#[async_trait]
impl ChatSource for ApiClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, OverrideChannelError> {
        debug!("Sending chat message for session {}", request.session_id);

        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Chat API returned status: {}", response.status());
            let (status, body) = error_body(response).await;
            return Err(OverrideChannelError::Status { status, body });
        }

        let reply: ChatReply = response.json().await?;
        info!("Chat reply carried {} listings", reply.properties.len());
        Ok(reply)
    }
}
