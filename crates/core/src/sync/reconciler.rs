//! A single reconciliation pass.
//!
//! Entries are keyed on their feed id: an entry whose id is already present
//! in the catalog is skipped, anything else is inserted with placeholders for
//! missing attributes. Entries lacking an id or a property bag are ignored
//! without aborting the pass.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::feed::{parse_feed, FeedEntry, FeedError, FeedSource};
use crate::metrics;
use crate::movie::{MovieRecord, MovieStore, NewMovie, StoreError};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_DIRECTOR: &str = "Unknown Director";
pub const UNKNOWN_PRODUCER: &str = "Unknown Producer";
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Outcome counts of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Entries inserted.
    pub synced: u32,
    /// Entries already present.
    pub skipped: u32,
    /// Entries refused by a uniqueness constraint.
    pub rejected: u32,
    /// Length of the feed list, malformed entries included.
    pub total: u32,
}

/// Why a feed entry was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEntry {
    #[error("entry has no id")]
    MissingId,

    #[error("entry {0} has no properties")]
    MissingProperties(String),
}

/// What to do with a single feed entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDecision {
    Insert(MovieRecord),
    Skip,
    Ignore(MalformedEntry),
}

/// Errors that abort a pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decide the fate of one entry.
///
/// `exists` reports whether a movie with the given feed id is already in the
/// catalog; it is only consulted for well-formed entries.
pub fn decide<F>(entry: &FeedEntry, exists: F) -> Result<EntryDecision, StoreError>
where
    F: FnOnce(&str) -> Result<bool, StoreError>,
{
    let Some(uid) = entry.uid.as_deref() else {
        return Ok(EntryDecision::Ignore(MalformedEntry::MissingId));
    };
    let Some(props) = entry.properties.as_ref() else {
        return Ok(EntryDecision::Ignore(MalformedEntry::MissingProperties(
            uid.to_string(),
        )));
    };

    if exists(uid)? {
        return Ok(EntryDecision::Skip);
    }

    let movie = NewMovie {
        title: props
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        episode_number: props.episode_id.unwrap_or(0),
        director: props
            .director
            .clone()
            .unwrap_or_else(|| UNKNOWN_DIRECTOR.to_string()),
        producer: props
            .producer
            .clone()
            .unwrap_or_else(|| UNKNOWN_PRODUCER.to_string()),
        release_date: props
            .release_date
            .clone()
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        opening_text: props.opening_crawl.clone(),
    };
    Ok(EntryDecision::Insert(MovieRecord::from_feed(uid, movie)))
}

/// Runs reconciliation passes against a store and a feed.
pub struct Reconciler<'a> {
    store: &'a dyn MovieStore,
    feed: &'a dyn FeedSource,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn MovieStore, feed: &'a dyn FeedSource) -> Self {
        Self { store, feed }
    }

    /// Run one full pass.
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let started = Instant::now();
        info!("Starting sync pass from feed '{}'", self.feed.name());

        let result = self.run_inner().await;

        let label = if result.is_ok() { "success" } else { "failed" };
        metrics::SYNC_RUNS.with_label_values(&[label]).inc();
        metrics::SYNC_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(summary) => info!(
                "Sync pass finished: synced={}, skipped={}, rejected={}, total={}",
                summary.synced, summary.skipped, summary.rejected, summary.total
            ),
            Err(e) => warn!("Sync pass failed: {}", e),
        }
        result
    }

    async fn run_inner(&self) -> Result<SyncSummary, SyncError> {
        let payload = self.feed.fetch().await?;
        let entries = parse_feed(&payload)?;

        let mut summary = SyncSummary {
            total: entries.len() as u32,
            ..Default::default()
        };

        for entry in &entries {
            let decision = decide(entry, |uid| {
                Ok(self.store.get_by_external_id(uid)?.is_some())
            })?;

            match decision {
                EntryDecision::Insert(record) => {
                    let external_id = record.external_id.clone();
                    match self.store.create(record) {
                        Ok(movie) => {
                            debug!(
                                "Imported '{}' (episode {}) from feed entry {}",
                                movie.title, movie.episode_number, external_id
                            );
                            summary.synced += 1;
                            metrics::SYNC_ENTRIES.with_label_values(&["synced"]).inc();
                        }
                        Err(StoreError::UniqueViolation { field }) => {
                            warn!(
                                "Rejected feed entry {}: {} already taken",
                                external_id, field
                            );
                            summary.rejected += 1;
                            metrics::SYNC_ENTRIES.with_label_values(&["rejected"]).inc();
                            let field = field.to_string();
                            metrics::CATALOG_CONFLICTS
                                .with_label_values(&[field.as_str()])
                                .inc();
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                EntryDecision::Skip => {
                    summary.skipped += 1;
                    metrics::SYNC_ENTRIES.with_label_values(&["skipped"]).inc();
                }
                EntryDecision::Ignore(reason) => {
                    warn!("Skipping malformed feed entry: {}", reason);
                    metrics::SYNC_ENTRIES.with_label_values(&["malformed"]).inc();
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FilmProperties;
    use crate::movie::{MovieFilter, SqliteMovieStore};
    use crate::testing::{fixtures, MockFeedSource, MockMovieStore};
    use serde_json::json;

    fn entry(uid: &str, properties: Option<FilmProperties>) -> FeedEntry {
        FeedEntry {
            uid: Some(uid.to_string()),
            properties,
        }
    }

    #[test]
    fn test_decide_missing_parts_are_ignored() {
        let lookup_called = std::cell::Cell::new(false);
        let decision = decide(&FeedEntry::default(), |_| {
            lookup_called.set(true);
            Ok(false)
        })
        .unwrap();
        assert_eq!(decision, EntryDecision::Ignore(MalformedEntry::MissingId));

        let decision = decide(&entry("2", None), |_| {
            lookup_called.set(true);
            Ok(false)
        })
        .unwrap();
        assert_eq!(
            decision,
            EntryDecision::Ignore(MalformedEntry::MissingProperties("2".to_string()))
        );
        assert!(!lookup_called.get());
    }

    #[test]
    fn test_decide_existing_is_skipped() {
        let decision = decide(&entry("1", Some(FilmProperties::default())), |uid| {
            assert_eq!(uid, "1");
            Ok(true)
        })
        .unwrap();
        assert_eq!(decision, EntryDecision::Skip);
    }

    #[test]
    fn test_decide_insert_uses_placeholders() {
        let decision = decide(&entry("9", Some(FilmProperties::default())), |_| Ok(false)).unwrap();
        let EntryDecision::Insert(record) = decision else {
            panic!("expected insert, got {:?}", decision);
        };
        assert_eq!(record.external_id, "9");
        assert_eq!(record.movie.title, UNKNOWN_TITLE);
        assert_eq!(record.movie.episode_number, 0);
        assert_eq!(record.movie.director, UNKNOWN_DIRECTOR);
        assert_eq!(record.movie.producer, UNKNOWN_PRODUCER);
        assert_eq!(record.movie.release_date, UNKNOWN_DATE);
        assert!(record.movie.opening_text.is_none());
    }

    #[test]
    fn test_decide_propagates_lookup_error() {
        let result = decide(&entry("1", Some(FilmProperties::default())), |_| {
            Err(StoreError::Database("locked".to_string()))
        });
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let store = SqliteMovieStore::in_memory().unwrap();
        let feed = MockFeedSource::with_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
            fixtures::film_entry("2", "The Empire Strikes Back", 5),
            fixtures::film_entry("3", "Return of the Jedi", 6),
        ]));
        let reconciler = Reconciler::new(&store, &feed);

        let first = reconciler.run().await.unwrap();
        assert_eq!(
            first,
            SyncSummary {
                synced: 3,
                skipped: 0,
                rejected: 0,
                total: 3
            }
        );

        let second = reconciler.run().await.unwrap();
        assert_eq!(second.synced, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(second.total, 3);
        assert_eq!(store.count(&MovieFilter::All).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_isolates_malformed_entry() {
        let store = MockMovieStore::new();
        let feed = MockFeedSource::with_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
            fixtures::film_entry_without_properties("2"),
            fixtures::film_entry("3", "Return of the Jedi", 6),
        ]));

        let summary = Reconciler::new(&store, &feed).run().await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.synced + summary.skipped, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_run_counts_rejected_entries() {
        let store = SqliteMovieStore::in_memory().unwrap();
        store
            .create(MovieRecord::manual(fixtures::new_movie("a new hope", 40)))
            .unwrap();
        let feed = MockFeedSource::with_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
            fixtures::film_entry("2", "The Empire Strikes Back", 5),
        ]));

        let summary = Reconciler::new(&store, &feed).run().await.unwrap();
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.total, 2);
    }

    #[tokio::test]
    async fn test_run_accepts_results_member() {
        let store = MockMovieStore::new();
        let feed = MockFeedSource::with_payload(json!({
            "results": [fixtures::film_entry("4", "The Phantom Menace", 1)]
        }));
        let summary = Reconciler::new(&store, &feed).run().await.unwrap();
        assert_eq!(summary.synced, 1);
    }

    #[tokio::test]
    async fn test_run_fails_on_bad_payload_without_writes() {
        let store = MockMovieStore::new();
        let feed = MockFeedSource::with_payload(json!({"result": []}));
        let result = Reconciler::new(&store, &feed).run().await;
        assert!(matches!(
            result,
            Err(SyncError::Feed(FeedError::UnexpectedFormat))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_on_fetch_error() {
        let store = MockMovieStore::new();
        let feed = MockFeedSource::new();
        feed.set_next_error(FeedError::ApiError {
            status: 503,
            message: "down".to_string(),
        })
        .await;
        let result = Reconciler::new(&store, &feed).run().await;
        assert!(matches!(result, Err(SyncError::Feed(_))));
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_run_store_failure_is_fatal() {
        let store = MockMovieStore::new();
        let feed = MockFeedSource::with_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
        ]));
        store.set_next_error("database is locked");
        let result = Reconciler::new(&store, &feed).run().await;
        assert!(matches!(result, Err(SyncError::Store(StoreError::Database(_)))));
    }
}
