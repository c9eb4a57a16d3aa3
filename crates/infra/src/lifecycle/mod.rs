//! Time-driven order status advancement.
//!
//! Correctness never depends on how regularly runs happen: each order carries
//! the timestamp of its last status change, and a run compares that against
//! the dwell threshold. Runs may be late, skipped or doubled.

pub mod advancer;
pub mod runner;

pub use advancer::StatusAdvancer;
pub use runner::{MIN_INTERVAL, SchedulerStats, SchedulerStatsReader, StatusSchedulerHandle, StatusSchedulerRunner};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use storefront_orders::StatusPipeline;

use crate::store::StoreError;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub pipeline: StatusPipeline,
    /// Minimum time an order spends in one status before moving on.
    pub dwell_threshold: Duration,
    /// Background runner cadence.
    pub tick_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            pipeline: StatusPipeline::default(),
            dwell_threshold: Duration::from_secs(10),
            tick_interval: Duration::from_secs(3),
        }
    }
}

/// Cooperative cancellation, checked between orders.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one advancement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub examined: usize,
    pub advanced: usize,
    pub not_due: usize,
    pub failed: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("an advancement run is already in progress")]
    AlreadyRunning,
    #[error("failed to load orders: {0}")]
    Load(#[from] StoreError),
}
