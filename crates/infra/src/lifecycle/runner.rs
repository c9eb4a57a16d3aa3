use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{CancellationFlag, RunError, RunReport, StatusAdvancer};
use crate::store::OrderStore;

/// Cumulative counters of a background runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub runs: u64,
    pub skipped_overlapping: u64,
    pub load_failures: u64,
    pub orders_advanced: u64,
    pub update_failures: u64,
    pub last_run: Option<RunReport>,
}

impl SchedulerStats {
    fn record(&mut self, outcome: &Result<RunReport, RunError>) {
        match outcome {
            Ok(report) => {
                self.runs += 1;
                self.orders_advanced += report.advanced as u64;
                self.update_failures += report.failed as u64;
                self.last_run = Some(*report);
            }
            Err(RunError::AlreadyRunning) => self.skipped_overlapping += 1,
            Err(RunError::Load(_)) => self.load_failures += 1,
        }
    }
}

/// Cloneable read-only view of a runner's [`SchedulerStats`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatsReader(Arc<Mutex<SchedulerStats>>);

impl SchedulerStatsReader {
    pub fn snapshot(&self) -> SchedulerStats {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Smallest cadence a runner accepts; shorter intervals are raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Background runner config.
#[derive(Debug, Clone)]
pub struct StatusSchedulerRunner {
    pub interval: Duration,
}

impl Default for StatusSchedulerRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
        }
    }
}

/// Handle for the running scheduler (shutdown + trigger hook + stats).
#[derive(Debug)]
pub struct StatusSchedulerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    cancel: CancellationFlag,
    stats: Arc<Mutex<SchedulerStats>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StatusSchedulerHandle {
    /// Request an immediate run. Triggers are coalesced: if one is already
    /// pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats_reader().snapshot()
    }

    pub fn stats_reader(&self) -> SchedulerStatsReader {
        SchedulerStatsReader(self.stats.clone())
    }

    /// Cancel any in-flight run between orders, stop the thread and wait for it.
    pub fn shutdown(mut self) {
        self.cancel.cancel();
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl StatusSchedulerRunner {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the runner thread. The first run happens immediately, then every
    /// `interval` (at least [`MIN_INTERVAL`]).
    pub fn spawn<S>(
        &self,
        name: &'static str,
        advancer: Arc<StatusAdvancer<S>>,
    ) -> std::io::Result<StatusSchedulerHandle>
    where
        S: OrderStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);
        let cancel = CancellationFlag::new();
        let stats = Arc::new(Mutex::new(SchedulerStats::default()));

        if self.interval < MIN_INTERVAL {
            warn!(
                runner = name,
                interval_ms = self.interval.as_millis() as u64,
                "scheduler interval too small; using minimum"
            );
        }
        let interval = self.interval.max(MIN_INTERVAL);
        let loop_cancel = cancel.clone();
        let loop_stats = stats.clone();
        let join = thread::Builder::new().name(name.to_string()).spawn(move || {
            runner_loop(
                name,
                interval,
                shutdown_rx,
                trigger_rx,
                loop_cancel,
                loop_stats,
                advancer,
            )
        })?;

        Ok(StatusSchedulerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            cancel,
            stats,
            join: Some(join),
        })
    }
}

fn runner_loop<S>(
    name: &'static str,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    cancel: CancellationFlag,
    stats: Arc<Mutex<SchedulerStats>>,
    advancer: Arc<StatusAdvancer<S>>,
) where
    S: OrderStore,
{
    info!(runner = name, interval_ms = interval.as_millis() as u64, "status scheduler started");

    let poll = Duration::from_millis(50).min(interval);
    let mut next_tick = Instant::now() + interval;
    let mut pending = true; // run once on startup

    loop {
        // Shutdown has priority.
        if shutdown_rx.try_recv().is_ok() || cancel.is_cancelled() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            // Keep a stable cadence even if we were delayed.
            while next_tick <= now {
                next_tick += interval;
            }
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if !pending {
            let wait = next_tick.saturating_duration_since(Instant::now()).min(poll);
            match shutdown_rx.recv_timeout(wait) {
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
            }
        }
        pending = false;

        let outcome = advancer.run_once(&cancel);
        match &outcome {
            Ok(report) if report.advanced > 0 || report.failed > 0 => {
                debug!(
                    runner = name,
                    examined = report.examined,
                    advanced = report.advanced,
                    failed = report.failed,
                    "advancement run finished"
                );
            }
            Ok(_) => {}
            Err(RunError::AlreadyRunning) => {
                debug!(runner = name, "advancement run skipped: previous run still active");
            }
            Err(e) => warn!(runner = name, error = %e, "advancement run failed"),
        }
        stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&outcome);
    }

    info!(runner = name, "status scheduler stopped");
}
