use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::movie::{StoreError, UniqueField};
use crate::sync::SyncError;

/// Errors surfaced by the catalog facade.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A uniqueness rule would be broken. `message` echoes the caller's value.
    #[error("Conflict: {message}")]
    Conflict { field: UniqueField, message: String },

    #[error("Movie with ID {0} not found")]
    NotFound(String),

    #[error("Failed to sync movies: {0}")]
    SyncFailed(String),

    /// The caller's role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl CatalogError {
    pub fn title_conflict(title: &str) -> Self {
        Self::Conflict {
            field: UniqueField::Title,
            message: format!("Movie with title \"{}\" already exists", title),
        }
    }

    pub fn episode_conflict(episode_number: i64) -> Self {
        Self::Conflict {
            field: UniqueField::EpisodeNumber,
            message: format!(
                "Movie with episode number {} already exists",
                episode_number
            ),
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => CatalogError::NotFound(id),
            StoreError::UniqueViolation { field } => CatalogError::Conflict {
                field,
                message: format!("Movie with this {} already exists", field),
            },
            StoreError::Database(msg) => CatalogError::Store(msg),
        }
    }
}

impl From<SyncError> for CatalogError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Feed(e) => CatalogError::SyncFailed(e.to_string()),
            SyncError::Store(e) => e.into(),
        }
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl DeleteConfirmation {
    pub fn for_id(id: &str) -> Self {
        Self {
            message: format!("Movie with ID {} has been deleted", id),
        }
    }
}
