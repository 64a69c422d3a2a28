//! Testing utilities and mock implementations.
//!
//! Provides in-memory stand-ins for the catalog store and the film feed so the
//! catalog service, the reconciler and the HTTP layer can be exercised without
//! a database file or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use holocron_core::testing::{fixtures, MockFeedSource, MockMovieStore};
//!
//! let store = Arc::new(MockMovieStore::new());
//! let feed = Arc::new(MockFeedSource::new());
//! feed.set_payload(fixtures::feed_payload(&[fixtures::film_entry("1", "A New Hope", 4)]));
//! ```

mod mock_feed;
mod mock_store;

pub use mock_feed::MockFeedSource;
pub use mock_store::MockMovieStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::movie::{MoviePatch, NewMovie};

    /// A new movie with reasonable defaults.
    pub fn new_movie(title: &str, episode_number: i64) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            episode_number,
            director: "George Lucas".to_string(),
            producer: "Gary Kurtz".to_string(),
            release_date: "1977-05-25".to_string(),
            opening_text: None,
        }
    }

    /// A new movie with explicit people.
    pub fn new_movie_by(
        title: &str,
        episode_number: i64,
        director: &str,
        producer: &str,
    ) -> NewMovie {
        NewMovie {
            director: director.to_string(),
            producer: producer.to_string(),
            ..new_movie(title, episode_number)
        }
    }

    /// Patch that only changes the title.
    pub fn title_patch(title: &str) -> MoviePatch {
        MoviePatch {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    /// A well-formed feed entry.
    pub fn film_entry(uid: &str, title: &str, episode_id: i64) -> Value {
        json!({
            "uid": uid,
            "properties": {
                "title": title,
                "episode_id": episode_id,
                "director": "George Lucas",
                "producer": "Rick McCallum",
                "release_date": "1999-05-19",
                "opening_crawl": "Turmoil has engulfed the Galactic Republic."
            }
        })
    }

    /// A feed entry without a property bag.
    pub fn film_entry_without_properties(uid: &str) -> Value {
        json!({ "uid": uid })
    }

    /// Wrap entries the way the feed does.
    pub fn feed_payload(entries: &[Value]) -> Value {
        json!({ "message": "ok", "result": entries })
    }
}
