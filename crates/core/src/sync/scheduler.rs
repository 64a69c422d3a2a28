//! Periodic reconciliation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::auth::Identity;
use crate::catalog::CatalogService;
use crate::config::SyncConfig;

/// Runs a reconciliation pass on a fixed interval until stopped.
pub struct SyncScheduler {
    config: SyncConfig,
    service: Arc<CatalogService>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncScheduler {
    pub fn new(config: SyncConfig, service: Arc<CatalogService>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            service,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the scheduler (spawns a background task).
    pub fn start(&self) {
        if !self.config.enabled {
            info!("Scheduled sync disabled");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync scheduler already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let service = Arc::clone(&self.service);
        let interval = Duration::from_secs(self.config.interval_secs);
        let run_on_startup = self.config.run_on_startup;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(
            "Starting sync scheduler: interval={}s, run_on_startup={}",
            interval.as_secs(),
            run_on_startup
        );

        tokio::spawn(async move {
            if run_on_startup {
                Self::run_pass(&service).await;
            }
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync scheduler received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::run_pass(&service).await;
                    }
                }
            }
            info!("Sync scheduler stopped");
        });
    }

    /// Stop the scheduler. A pass already in flight runs to completion.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping sync scheduler");
        let _ = self.shutdown_tx.send(());
    }

    async fn run_pass(service: &CatalogService) {
        if let Err(e) = service.reconcile(&Identity::system()).await {
            error!("Scheduled sync failed: {}", e);
        }
    }
}
