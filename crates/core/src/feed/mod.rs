//! External film feed.
//!
//! The feed is the authoritative (but unreliable) source that reconciliation
//! pulls from. Payloads are kept as raw JSON until they reach the reconciler so
//! that one bad entry never poisons the whole pass.

mod swapi;
mod types;

pub use swapi::SwapiClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when fetching the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Feed returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response body was not JSON.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Payload did not carry a non-empty film list.
    #[error("unexpected feed format")]
    UnexpectedFormat,

    /// Client not configured.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of the raw feed payload.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the complete feed payload.
    async fn fetch(&self) -> Result<serde_json::Value, FeedError>;

    /// Name used in logs and metrics.
    fn name(&self) -> &str;
}
