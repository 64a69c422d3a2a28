//! Movie entity and its storage.
//!
//! The store is the only shared mutable resource of the catalog; every
//! component receives it explicitly as an `Arc<dyn MovieStore>`.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteMovieStore;
pub use store::{MovieStore, StoreError, UniqueField};
pub use types::*;
