//! Catalog consistency engine.
//!
//! The [`CatalogService`] facade composes the uniqueness guard, the query
//! planner and the reconciler over an injected [`MovieStore`].
//!
//! [`MovieStore`]: crate::movie::MovieStore

mod error;
mod guard;
mod query;
mod service;

pub use error::*;
pub use guard::UniquenessGuard;
pub use query::*;
pub use service::CatalogService;
