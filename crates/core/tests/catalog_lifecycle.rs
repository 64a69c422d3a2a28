//! Catalog lifecycle integration tests.
//!
//! These tests drive the catalog service over a file-backed SQLite store:
//! manual entries, feed reconciliation, scheduled sync and restarts.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use holocron_core::{
    config::SyncConfig,
    testing::{fixtures, MockFeedSource},
    CatalogError, CatalogService, Identity, ListQuery, MovieStore, SqliteMovieStore,
    SyncScheduler,
};

/// Test helper holding the service and its collaborators.
struct TestHarness {
    service: Arc<CatalogService>,
    feed: Arc<MockFeedSource>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let feed = Arc::new(MockFeedSource::new());
        let service = Self::open(&temp_dir, Arc::clone(&feed));
        Self {
            service,
            feed,
            temp_dir,
        }
    }

    fn open(temp_dir: &TempDir, feed: Arc<MockFeedSource>) -> Arc<CatalogService> {
        let store: Arc<dyn MovieStore> = Arc::new(
            SqliteMovieStore::new(&temp_dir.path().join("catalog.db"))
                .expect("Failed to create store"),
        );
        Arc::new(CatalogService::new(store, feed))
    }

    /// Reopen the database as a fresh service.
    fn reopen(&self) -> Arc<CatalogService> {
        Self::open(&self.temp_dir, Arc::clone(&self.feed))
    }
}

#[tokio::test]
async fn test_manual_entries_and_feed_coexist() {
    let harness = TestHarness::new();
    let admin = Identity::system();

    harness
        .service
        .create(&admin, fixtures::new_movie("Rogue One", 0))
        .unwrap();

    harness
        .feed
        .set_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
            fixtures::film_entry("2", "The Empire Strikes Back", 5),
            fixtures::film_entry("3", "ROGUE ONE ", 33),
        ]))
        .await;

    let summary = harness.service.reconcile(&admin).await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.synced, 2);
    assert_eq!(summary.rejected, 1);

    let all = harness.service.list_all().unwrap();
    let titles: Vec<_> = all.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Rogue One", "A New Hope", "The Empire Strikes Back"]);

    // Feed entries can be edited locally and are not re-imported.
    let imported = &all[1];
    harness
        .service
        .update(&admin, &imported.id, fixtures::title_patch("Star Wars"))
        .unwrap();
    let summary = harness.service.reconcile(&admin).await.unwrap();
    assert_eq!(summary.synced, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.rejected, 1);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let harness = TestHarness::new();
    let admin = Identity::system();
    harness
        .feed
        .set_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
        ]))
        .await;
    harness.service.reconcile(&admin).await.unwrap();
    let manual = harness
        .service
        .create(&admin, fixtures::new_movie("Solo", 0))
        .unwrap();

    let reopened = harness.reopen();
    assert_eq!(reopened.get_by_id(&manual.id).unwrap().title, "Solo");

    let summary = reopened.reconcile(&admin).await.unwrap();
    assert_eq!(summary.synced, 0);
    assert_eq!(summary.skipped, 1);

    let err = reopened
        .create(&admin, fixtures::new_movie("solo", 9))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Conflict { .. }));
}

#[tokio::test]
async fn test_deleted_feed_entry_is_reimported() {
    let harness = TestHarness::new();
    let admin = Identity::system();
    harness
        .feed
        .set_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
        ]))
        .await;
    harness.service.reconcile(&admin).await.unwrap();

    let movie = harness.service.list_all().unwrap().remove(0);
    harness.service.delete(&admin, &movie.id).unwrap();

    let summary = harness.service.reconcile(&admin).await.unwrap();
    assert_eq!(summary.synced, 1);
    let page = harness
        .service
        .list_paginated(&ListQuery::default())
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_ne!(page.data[0].id, movie.id);
}

#[tokio::test]
async fn test_scheduler_syncs_in_background() {
    let harness = TestHarness::new();
    harness
        .feed
        .set_payload(fixtures::feed_payload(&[
            fixtures::film_entry("1", "A New Hope", 4),
            fixtures::film_entry("2", "The Empire Strikes Back", 5),
        ]))
        .await;

    let scheduler = SyncScheduler::new(
        SyncConfig {
            enabled: true,
            interval_secs: 3600,
            run_on_startup: true,
        },
        Arc::clone(&harness.service),
    );
    scheduler.start();

    let mut imported = 0;
    for _ in 0..40 {
        imported = harness.service.list_all().unwrap().len();
        if imported == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    scheduler.stop();

    assert_eq!(imported, 2);
    assert_eq!(harness.feed.fetch_count(), 1);
}
