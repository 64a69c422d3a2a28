//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Reconciliation (passes, per-entry outcomes)
//! - Catalog (uniqueness conflicts)
//! - Feed requests

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Reconciliation Metrics
// =============================================================================

/// Sync passes total by result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("holocron_sync_runs_total", "Total reconciliation passes"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Sync pass duration in seconds.
pub static SYNC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "holocron_sync_duration_seconds",
            "Duration of reconciliation passes",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Feed entries processed by outcome.
pub static SYNC_ENTRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("holocron_sync_entries_total", "Feed entries processed"),
        &["outcome"], // "synced", "skipped", "malformed", "rejected"
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Uniqueness conflicts by field.
pub static CATALOG_CONFLICTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "holocron_catalog_conflicts_total",
            "Writes rejected by a uniqueness conflict",
        ),
        &["field"], // "title", "episode_number", "external_id"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(SYNC_ENTRIES.clone()),
        Box::new(CATALOG_CONFLICTS.clone()),
    ]
}
