//! Parallel Search API client
//!
//! Issues exactly one POST per search. No retries, no caching.

use std::time::Duration;

use crate::config::parallel::API_KEY_HEADER;
use crate::config::Config;
use crate::error::{Result, SearchError};
use crate::parallel::request::PreparedSearch;
use crate::parallel::types::SearchResponse;

/// Parallel Search API client
#[derive(Debug, Clone)]
pub struct ParallelClient {
    /// HTTP client, configured with the request timeout
    http_client: reqwest::Client,

    /// Search endpoint
    api_url: String,
}

impl ParallelClient {
    /// Create a new client for the given endpoint
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
        })
    }

    /// Create a client from the startup configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    /// Search endpoint this client posts to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Run a search
    ///
    /// Non-2xx responses become [`SearchError::Upstream`] with the raw body
    /// text; transport failures (reading that body included) and
    /// undecodable bodies become
    /// [`SearchError::Timeout`] or [`SearchError::Transport`].
    pub async fn search(
        &self,
        search: &PreparedSearch,
    ) -> std::result::Result<SearchResponse, SearchError> {
        tracing::debug!(
            processor = search.request.processor.as_str(),
            key_source = %search.key_source,
            "Sending search request"
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .header(API_KEY_HEADER, &search.api_key)
            .json(&search.request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::warn!(status = status.as_u16(), "Search API returned an error status");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::debug!(
            search_id = parsed.search_id.as_deref().unwrap_or("unknown"),
            results = parsed.entries().len(),
            "Search completed"
        );

        Ok(parsed)
    }
}
