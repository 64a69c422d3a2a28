//! HTTP client for the film feed (SWAPI-compatible).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{FeedError, FeedSource};
use crate::config::FeedConfig;

/// Feed client that fetches the film list over HTTP.
pub struct SwapiClient {
    client: Client,
    url: String,
}

impl SwapiClient {
    /// Create a new feed client.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        if config.url.trim().is_empty() {
            return Err(FeedError::NotConfigured("feed url is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for SwapiClient {
    async fn fetch(&self) -> Result<serde_json::Value, FeedError> {
        debug!("Fetching film feed: url={}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::ParseError(format!("Failed to parse feed response: {}", e)))
    }

    fn name(&self) -> &str {
        "swapi"
    }
}
