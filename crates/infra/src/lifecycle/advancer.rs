use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use storefront_core::{AggregateRoot, Clock};
use storefront_orders::StatusPipeline;

use super::{CancellationFlag, LifecycleConfig, RunError, RunReport};
use crate::store::OrderStore;

/// Advances every due order by one pipeline step per run.
pub struct StatusAdvancer<S> {
    store: S,
    clock: Arc<dyn Clock>,
    pipeline: StatusPipeline,
    dwell: chrono::Duration,
    running: AtomicBool,
}

// Clears the in-progress flag even if a run unwinds.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S> StatusAdvancer<S>
where
    S: OrderStore,
{
    pub fn new(store: S, clock: Arc<dyn Clock>, config: &LifecycleConfig) -> Self {
        Self {
            store,
            clock,
            pipeline: config.pipeline.clone(),
            dwell: chrono::Duration::from_std(config.dwell_threshold)
                .unwrap_or(chrono::Duration::MAX),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// One pass over the full order set.
    ///
    /// "Now" is read once per run. A failed or conflicting write is logged and
    /// counted; the remaining orders are still processed. Returns `AlreadyRunning` without
    /// touching anything when another run holds the guard.
    pub fn run_once(&self, cancel: &CancellationFlag) -> Result<RunReport, RunError> {
        let _guard = RunGuard::acquire(&self.running).ok_or(RunError::AlreadyRunning)?;

        let orders = self.store.list_orders()?;
        let now = self.clock.now();
        let mut report = RunReport::default();

        for mut order in orders {
            if cancel.is_cancelled() {
                report.cancelled = true;
                debug!(examined = report.examined, "advancement run cancelled");
                break;
            }
            report.examined += 1;
            let loaded_version = order.version();

            let Some(change) = order.advance_if_due(&self.pipeline, self.dwell, now) else {
                report.not_due += 1;
                continue;
            };

            // Versioned write: an order changed since it was listed (e.g. cancelled)
            // is left alone and recomputed from stored state next run.
            match self.store.update_order(&order, loaded_version) {
                Ok(()) => {
                    report.advanced += 1;
                    info!(
                        order_id = %order.id_typed(),
                        from = %change.from,
                        to = %change.to,
                        "order status advanced"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        order_id = %order.id_typed(),
                        from = %change.from,
                        to = %change.to,
                        error = %e,
                        "failed to persist order status change"
                    );
                }
            }
        }

        Ok(report)
    }
}
