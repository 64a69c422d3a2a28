//! Reconciliation of the local catalog against the external feed.

mod reconciler;
mod scheduler;

pub use reconciler::*;
pub use scheduler::SyncScheduler;
