//! Catalog facade: CRUD, listing and reconciliation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CatalogError, DeleteConfirmation, ListQuery, PageMeta, Paginated, UniquenessGuard};
use crate::auth::Identity;
use crate::feed::FeedSource;
use crate::metrics;
use crate::movie::{
    Movie, MovieFilter, MoviePatch, MovieRecord, MovieSort, MovieStore, NewMovie, SortDirection,
    SortField, StoreError, UniqueField,
};
use crate::sync::{Reconciler, SyncSummary};

/// Public entry point of the catalog.
///
/// Mutations and sync require an ADMIN identity. Reads are open to any
/// authenticated caller.
pub struct CatalogService {
    store: Arc<dyn MovieStore>,
    feed: Arc<dyn FeedSource>,
    sync_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn MovieStore>, feed: Arc<dyn FeedSource>) -> Self {
        Self {
            store,
            feed,
            sync_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn MovieStore> {
        &self.store
    }

    /// Create a movie by hand.
    pub fn create(&self, identity: &Identity, movie: NewMovie) -> Result<Movie, CatalogError> {
        require_admin(identity, "create movies")?;
        movie.validate().map_err(CatalogError::Validation)?;

        let guard = UniquenessGuard::new(self.store.as_ref());
        if guard.check_title_conflict(&movie.title, None)?.is_some() {
            return Err(conflict(CatalogError::title_conflict(&movie.title)));
        }
        if guard
            .check_episode_conflict(movie.episode_number, None)?
            .is_some()
        {
            return Err(conflict(CatalogError::episode_conflict(
                movie.episode_number,
            )));
        }

        let title = movie.title.clone();
        let episode_number = movie.episode_number;
        let created = self
            .store
            .create(MovieRecord::manual(movie))
            .map_err(|e| write_error(e, &title, episode_number))?;

        info!(
            "Created movie {} '{}' (episode {}) by {}",
            created.id, created.title, created.episode_number, identity.user_id
        );
        Ok(created)
    }

    /// Apply a partial update.
    pub fn update(
        &self,
        identity: &Identity,
        id: &str,
        patch: MoviePatch,
    ) -> Result<Movie, CatalogError> {
        require_admin(identity, "update movies")?;
        patch.validate().map_err(CatalogError::Validation)?;

        let current = self.get_by_id(id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let guard = UniquenessGuard::new(self.store.as_ref());
        if let Some(title) = patch.title.as_deref() {
            if title != current.title && guard.check_title_conflict(title, Some(id))?.is_some() {
                return Err(conflict(CatalogError::title_conflict(title)));
            }
        }
        if let Some(episode_number) = patch.episode_number {
            if episode_number != current.episode_number
                && guard
                    .check_episode_conflict(episode_number, Some(id))?
                    .is_some()
            {
                return Err(conflict(CatalogError::episode_conflict(episode_number)));
            }
        }

        let title = patch.title.as_deref().unwrap_or(&current.title);
        let episode_number = patch.episode_number.unwrap_or(current.episode_number);
        let updated = self
            .store
            .update(id, &patch)
            .map_err(|e| write_error(e, title, episode_number))?;

        info!("Updated movie {} by {}", id, identity.user_id);
        Ok(updated)
    }

    /// Remove a movie.
    pub fn delete(&self, identity: &Identity, id: &str) -> Result<DeleteConfirmation, CatalogError> {
        require_admin(identity, "delete movies")?;
        self.get_by_id(id)?;
        self.store.delete(id)?;

        info!("Deleted movie {} by {}", id, identity.user_id);
        Ok(DeleteConfirmation::for_id(id))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Movie, CatalogError> {
        self.store
            .get(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Every movie, by episode number.
    pub fn list_all(&self) -> Result<Vec<Movie>, CatalogError> {
        let filter = MovieFilter::All;
        let total = self.store.count(&filter)?;
        let sort = MovieSort {
            field: SortField::EpisodeNumber,
            direction: SortDirection::Asc,
        };
        Ok(self.store.scan(&filter, sort, 0, total)?)
    }

    /// One page of movies matching the query.
    pub fn list_paginated(&self, query: &ListQuery) -> Result<Paginated<Movie>, CatalogError> {
        let plan = query.validate()?;
        debug!("Listing movies: {:?}", plan);

        let total = self.store.count(&plan.filter)?;
        let data = match plan.offset() {
            Some(offset) if offset < total => {
                self.store
                    .scan(&plan.filter, plan.sort, offset, plan.limit)?
            }
            _ => Vec::new(),
        };

        Ok(Paginated {
            data,
            meta: PageMeta::compute(plan.page, plan.limit, total),
        })
    }

    /// Run one reconciliation pass. Concurrent calls wait for each other.
    pub async fn reconcile(&self, identity: &Identity) -> Result<SyncSummary, CatalogError> {
        require_admin(identity, "sync movies")?;
        let _pass = self.sync_lock.lock().await;

        info!("Sync requested by {}", identity.user_id);
        let summary = Reconciler::new(self.store.as_ref(), self.feed.as_ref())
            .run()
            .await?;
        Ok(summary)
    }
}

fn require_admin(identity: &Identity, action: &str) -> Result<(), CatalogError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "role {} may not {}",
            identity.role, action
        )))
    }
}

fn conflict(err: CatalogError) -> CatalogError {
    if let CatalogError::Conflict { field, .. } = &err {
        let field = field.to_string();
        metrics::CATALOG_CONFLICTS
            .with_label_values(&[field.as_str()])
            .inc();
    }
    err
}

/// Map a failed write, echoing the caller's values in conflict messages.
fn write_error(e: StoreError, title: &str, episode_number: i64) -> CatalogError {
    match e {
        StoreError::UniqueViolation {
            field: UniqueField::Title,
        } => conflict(CatalogError::title_conflict(title)),
        StoreError::UniqueViolation {
            field: UniqueField::EpisodeNumber,
        } => conflict(CatalogError::episode_conflict(episode_number)),
        other => conflict(other.into()),
    }
}
