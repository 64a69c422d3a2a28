//! In-memory movie store for testing.

use std::cmp::Ordering;
use std::sync::RwLock;

use chrono::Utc;

use crate::movie::{
    normalize_title, Movie, MovieFilter, MoviePatch, MovieRecord, MovieSort, MovieStore,
    SortDirection, SortField, StoreError, UniqueField,
};

/// Mock implementation of the MovieStore trait.
///
/// Enforces the same uniqueness rules as the SQLite store and can be told to
/// fail the next operation with a database error, or the next write with a
/// unique violation the lookups never saw.
#[derive(Debug, Default)]
pub struct MockMovieStore {
    movies: RwLock<Vec<Movie>>,
    next_error: RwLock<Option<String>>,
    next_write_violation: RwLock<Option<UniqueField>>,
}

impl MockMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store operation fail with `StoreError::Database`.
    pub fn set_next_error(&self, message: &str) {
        *self.next_error.write().unwrap() = Some(message.to_string());
    }

    /// Make the next `create` or `update` fail with a unique violation on
    /// `field`, as if a concurrent writer got there first.
    pub fn set_next_write_violation(&self, field: UniqueField) {
        *self.next_write_violation.write().unwrap() = Some(field);
    }

    /// Number of stored movies.
    pub fn len(&self) -> usize {
        self.movies.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_error(&self) -> Result<(), StoreError> {
        match self.next_error.write().unwrap().take() {
            Some(message) => Err(StoreError::Database(message)),
            None => Ok(()),
        }
    }

    fn check_write_violation(&self) -> Result<(), StoreError> {
        match self.next_write_violation.write().unwrap().take() {
            Some(field) => Err(StoreError::UniqueViolation { field }),
            None => Ok(()),
        }
    }

    fn matches(movie: &Movie, filter: &MovieFilter) -> bool {
        match filter {
            MovieFilter::All => true,
            MovieFilter::TitleKey(key) => normalize_title(&movie.title) == *key,
            MovieFilter::EpisodeNumber(n) => movie.episode_number == *n,
            MovieFilter::Search(term) => {
                let term = term.to_lowercase();
                [&movie.title, &movie.director, &movie.producer]
                    .iter()
                    .any(|v| v.to_lowercase().contains(&term))
            }
        }
    }

    fn compare(a: &Movie, b: &Movie, field: SortField) -> Ordering {
        match field {
            SortField::Title => a.title.cmp(&b.title),
            SortField::EpisodeNumber => a.episode_number.cmp(&b.episode_number),
            SortField::Director => a.director.cmp(&b.director),
            SortField::Producer => a.producer.cmp(&b.producer),
            SortField::ReleaseDate => a.release_date.cmp(&b.release_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }

    fn check_unique(
        movies: &[Movie],
        id: Option<&str>,
        title: &str,
        episode_number: i64,
        external_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let key = normalize_title(title);
        for other in movies.iter().filter(|m| Some(m.id.as_str()) != id) {
            if normalize_title(&other.title) == key {
                return Err(StoreError::UniqueViolation {
                    field: UniqueField::Title,
                });
            }
            if other.episode_number == episode_number {
                return Err(StoreError::UniqueViolation {
                    field: UniqueField::EpisodeNumber,
                });
            }
            if let Some(ext) = external_id {
                if !other.is_manual_entry() && other.external_id == ext {
                    return Err(StoreError::UniqueViolation {
                        field: UniqueField::ExternalId,
                    });
                }
            }
        }
        Ok(())
    }
}

impl MovieStore for MockMovieStore {
    fn create(&self, record: MovieRecord) -> Result<Movie, StoreError> {
        self.check_error()?;
        self.check_write_violation()?;
        let mut movies = self.movies.write().unwrap();
        let movie = record.movie;
        let manual = record.external_id == crate::movie::MANUAL_ENTRY;
        Self::check_unique(
            &movies,
            None,
            &movie.title,
            movie.episode_number,
            (!manual).then_some(record.external_id.as_str()),
        )?;

        let now = Utc::now();
        let created = Movie {
            id: uuid::Uuid::new_v4().to_string(),
            external_id: record.external_id,
            title: movie.title,
            episode_number: movie.episode_number,
            director: movie.director,
            producer: movie.producer,
            release_date: movie.release_date,
            opening_text: movie.opening_text,
            created_at: now,
            updated_at: now,
        };
        movies.push(created.clone());
        Ok(created)
    }

    fn get(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        self.check_error()?;
        Ok(self.movies.read().unwrap().iter().find(|m| m.id == id).cloned())
    }

    fn get_by_external_id(&self, external_id: &str) -> Result<Option<Movie>, StoreError> {
        self.check_error()?;
        Ok(self
            .movies
            .read()
            .unwrap()
            .iter()
            .find(|m| m.external_id == external_id)
            .cloned())
    }

    fn find_one(&self, filter: &MovieFilter) -> Result<Option<Movie>, StoreError> {
        self.check_error()?;
        Ok(self
            .movies
            .read()
            .unwrap()
            .iter()
            .find(|m| Self::matches(m, filter))
            .cloned())
    }

    fn count(&self, filter: &MovieFilter) -> Result<u64, StoreError> {
        self.check_error()?;
        Ok(self
            .movies
            .read()
            .unwrap()
            .iter()
            .filter(|m| Self::matches(m, filter))
            .count() as u64)
    }

    fn scan(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Movie>, StoreError> {
        self.check_error()?;
        let mut rows: Vec<Movie> = self
            .movies
            .read()
            .unwrap()
            .iter()
            .filter(|m| Self::matches(m, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ord = Self::compare(a, b, sort.field);
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    fn update(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError> {
        self.check_error()?;
        self.check_write_violation()?;
        let mut movies = self.movies.write().unwrap();
        let idx = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if patch.is_empty() {
            return Ok(movies[idx].clone());
        }

        let mut updated = movies[idx].clone();
        if let Some(title) = &patch.title {
            updated.title = title.clone();
        }
        if let Some(n) = patch.episode_number {
            updated.episode_number = n;
        }
        if let Some(director) = &patch.director {
            updated.director = director.clone();
        }
        if let Some(producer) = &patch.producer {
            updated.producer = producer.clone();
        }
        if let Some(date) = &patch.release_date {
            updated.release_date = date.clone();
        }
        if let Some(text) = &patch.opening_text {
            updated.opening_text = Some(text.clone());
        }
        Self::check_unique(
            &movies,
            Some(id),
            &updated.title,
            updated.episode_number,
            None,
        )?;
        updated.updated_at = Utc::now();
        movies[idx] = updated.clone();
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_error()?;
        let mut movies = self.movies.write().unwrap();
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_mock_store_uniqueness() {
        let store = MockMovieStore::new();
        store
            .create(MovieRecord::manual(fixtures::new_movie("A New Hope", 4)))
            .unwrap();

        let err = store
            .create(MovieRecord::manual(fixtures::new_movie(" a new hope", 5)))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::Title
            }
        ));

        let err = store
            .create(MovieRecord::manual(fixtures::new_movie("Other", 4)))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::EpisodeNumber
            }
        ));

        // Two manual entries never collide on external id.
        store
            .create(MovieRecord::manual(fixtures::new_movie("Other", 5)))
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_mock_store_error_injection() {
        let store = MockMovieStore::new();
        store.set_next_error("disk on fire");
        assert!(matches!(
            store.count(&MovieFilter::All),
            Err(StoreError::Database(_))
        ));
        assert_eq!(store.count(&MovieFilter::All).unwrap(), 0);
    }

    #[test]
    fn test_mock_store_write_violation_skips_lookups() {
        let store = MockMovieStore::new();
        store.set_next_write_violation(UniqueField::Title);

        // Reads are unaffected
        assert!(store
            .find_one(&MovieFilter::TitleKey("a new hope".to_string()))
            .unwrap()
            .is_none());

        let err = store
            .create(MovieRecord::manual(fixtures::new_movie("A New Hope", 4)))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::Title
            }
        ));
        assert!(store.is_empty());

        store
            .create(MovieRecord::manual(fixtures::new_movie("A New Hope", 4)))
            .unwrap();
        assert_eq!(store.len(), 1);
    }
}
