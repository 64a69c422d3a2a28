//! Movie catalog API handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use holocron_core::{
    CatalogError, DeleteConfirmation, ListQuery, Movie, MoviePatch, NewMovie, Paginated,
    SyncSummary,
};

use super::handlers::ErrorResponse;
use super::middleware::CurrentIdentity;
use crate::metrics::FORBIDDEN_TOTAL;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Response for a sync request
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: SyncSummary,
}

fn error_response(status: StatusCode, error: String) -> ApiError {
    (status, Json(ErrorResponse { error }))
}

/// Map a catalog error to its HTTP status. Conflict bodies carry the bare
/// message, which echoes the caller's input.
fn catalog_error(operation: &str, e: CatalogError) -> ApiError {
    match e {
        CatalogError::Conflict { message, .. } => error_response(StatusCode::CONFLICT, message),
        CatalogError::NotFound(_) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        CatalogError::Forbidden(_) => {
            FORBIDDEN_TOTAL.with_label_values(&[operation]).inc();
            error_response(StatusCode::FORBIDDEN, e.to_string())
        }
        CatalogError::Validation(_) | CatalogError::InvalidQuery(_) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        CatalogError::SyncFailed(_) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
        CatalogError::Store(_) => {
            warn!("Store failure during {}: {}", operation, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// List movies, one page at a time
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    _identity: CurrentIdentity,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Paginated<Movie>>, ApiError> {
    let Query(query) =
        query.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
    state
        .catalog()
        .list_paginated(&query)
        .map(Json)
        .map_err(|e| catalog_error("list", e))
}

/// List every movie by episode number
pub async fn list_all_movies(
    State(state): State<Arc<AppState>>,
    _identity: CurrentIdentity,
) -> Result<Json<Vec<Movie>>, ApiError> {
    state
        .catalog()
        .list_all()
        .map(Json)
        .map_err(|e| catalog_error("list_all", e))
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    _identity: CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    state
        .catalog()
        .get_by_id(&id)
        .map(Json)
        .map_err(|e| catalog_error("get", e))
}

/// Create a movie (ADMIN)
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<NewMovie>, JsonRejection>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    let Json(movie) = body.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
    state
        .catalog()
        .create(&identity, movie)
        .map(|m| (StatusCode::CREATED, Json(m)))
        .map_err(|e| catalog_error("create", e))
}

/// Partially update a movie (ADMIN)
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<String>,
    body: Result<Json<MoviePatch>, JsonRejection>,
) -> Result<Json<Movie>, ApiError> {
    let Json(patch) = body.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
    state
        .catalog()
        .update(&identity, &id, patch)
        .map(Json)
        .map_err(|e| catalog_error("update", e))
}

/// Delete a movie (ADMIN)
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    state
        .catalog()
        .delete(&identity, &id)
        .map(Json)
        .map_err(|e| catalog_error("delete", e))
}

/// Reconcile against the external feed (ADMIN)
pub async fn sync_movies(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<SyncResponse>, ApiError> {
    let summary = state
        .catalog()
        .reconcile(&identity)
        .await
        .map_err(|e| catalog_error("sync", e))?;
    Ok(Json(SyncResponse {
        message: "Movies synced successfully".to_string(),
        summary,
    }))
}
