//! Uniqueness checks run before a write.

use crate::movie::{normalize_title, Movie, MovieFilter, MovieStore, StoreError};

/// Read-only conflict detection for titles and episode numbers.
///
/// Each check returns the conflicting movie, if any, so callers can build an
/// error message from their own input.
pub struct UniquenessGuard<'a> {
    store: &'a dyn MovieStore,
}

impl<'a> UniquenessGuard<'a> {
    pub fn new(store: &'a dyn MovieStore) -> Self {
        Self { store }
    }

    /// Find a movie whose title equals `title` after trimming and
    /// lower-casing both sides. A match on `exclude_id` is not a conflict.
    pub fn check_title_conflict(
        &self,
        title: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Movie>, StoreError> {
        let found = self
            .store
            .find_one(&MovieFilter::TitleKey(normalize_title(title)))?;
        Ok(excluding(found, exclude_id))
    }

    /// Find a movie with the given episode number, ignoring `exclude_id`.
    pub fn check_episode_conflict(
        &self,
        episode_number: i64,
        exclude_id: Option<&str>,
    ) -> Result<Option<Movie>, StoreError> {
        let found = self
            .store
            .find_one(&MovieFilter::EpisodeNumber(episode_number))?;
        Ok(excluding(found, exclude_id))
    }
}

fn excluding(found: Option<Movie>, exclude_id: Option<&str>) -> Option<Movie> {
    found.filter(|m| Some(m.id.as_str()) != exclude_id)
}
