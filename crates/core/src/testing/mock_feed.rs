//! Mock film feed for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::feed::{FeedError, FeedSource};

/// Mock implementation of the FeedSource trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable payload
/// - Count fetches for assertions
/// - Simulate failures
#[derive(Debug)]
pub struct MockFeedSource {
    payload: Arc<RwLock<Value>>,
    fetch_count: AtomicU32,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FeedError>>>,
}

impl Default for MockFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedSource {
    /// Create a mock whose payload has no film list.
    pub fn new() -> Self {
        Self::with_payload(Value::Object(Default::default()))
    }

    pub fn with_payload(payload: Value) -> Self {
        Self {
            payload: Arc::new(RwLock::new(payload)),
            fetch_count: AtomicU32::new(0),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the payload returned by subsequent fetches.
    pub async fn set_payload(&self, payload: Value) {
        *self.payload.write().await = payload;
    }

    /// Make the next fetch fail.
    pub async fn set_next_error(&self, error: FeedError) {
        *self.next_error.write().await = Some(error);
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self) -> Result<Value, FeedError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.payload.read().await.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
