//! Movie storage trait and errors.

use std::fmt;

use thiserror::Error;

use super::{Movie, MovieFilter, MoviePatch, MovieRecord, MovieSort};

/// Field protected by a store-level unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Title,
    EpisodeNumber,
    ExternalId,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Title => write!(f, "title"),
            UniqueField::EpisodeNumber => write!(f, "episode_number"),
            UniqueField::ExternalId => write!(f, "external_id"),
        }
    }
}

/// Errors for movie store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Movie not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated on {field}")]
    UniqueViolation { field: UniqueField },

    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for movie storage backends.
///
/// Implementations must enforce the uniqueness of normalized titles, episode
/// numbers, and non-manual external ids, reporting violations as
/// [`StoreError::UniqueViolation`].
pub trait MovieStore: Send + Sync {
    /// Insert a movie, assigning a fresh id and timestamps.
    fn create(&self, record: MovieRecord) -> Result<Movie, StoreError>;

    /// Get a movie by id.
    fn get(&self, id: &str) -> Result<Option<Movie>, StoreError>;

    /// Get a movie by its feed identifier.
    fn get_by_external_id(&self, external_id: &str) -> Result<Option<Movie>, StoreError>;

    /// First movie matching the filter, if any.
    fn find_one(&self, filter: &MovieFilter) -> Result<Option<Movie>, StoreError>;

    /// Number of movies matching the filter.
    fn count(&self, filter: &MovieFilter) -> Result<u64, StoreError>;

    /// Movies matching the filter, ordered and paged.
    fn scan(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Movie>, StoreError>;

    /// Apply a partial update and return the updated movie.
    fn update(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError>;

    /// Delete a movie.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}
