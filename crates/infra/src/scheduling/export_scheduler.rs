//! Export scheduler: runs one [`ExportCycle`] per tick on a background task.
//!
//! Lifecycle is explicit: [`ExportScheduler::start`] spawns the loop and keeps
//! its join handle, [`ExportScheduler::stop`] cancels it and awaits the handle
//! under a timeout. The cycle (and with it the retry buffer) moves into the
//! task on start, so a stopped scheduler cannot be restarted.
//!
//! The loop selects between cancellation and the ticker with cancellation
//! polled first. Once cancellation is observed no further cycle starts; a
//! cycle already in flight finishes, bounded by the store write timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use metricbridge_core::{ExportCycle, ExportCycleConfig};
//! use metricbridge_domain::BatchConfig;
//! use metricbridge_infra::observability::MetricsRegistry;
//! use metricbridge_infra::scheduling::{
//!     ExportScheduler, ExportSchedulerConfig, SchedulerResult,
//! };
//! use metricbridge_infra::store::InMemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> SchedulerResult<()> {
//! let cycle = ExportCycle::new(
//!     Arc::new(MetricsRegistry::new()),
//!     Arc::new(InMemoryStore::new()),
//!     ExportCycleConfig {
//!         hostname: "node-01".into(),
//!         batch_config: BatchConfig::new("metrics"),
//!         buffer_size: 100,
//!         write_timeout: Some(Duration::from_secs(5)),
//!     },
//! );
//! let mut scheduler = ExportScheduler::new(
//!     cycle,
//!     ExportSchedulerConfig::new(Duration::from_secs(30)),
//!     CancellationToken::new(),
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use metricbridge_core::ExportCycle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::metrics::ExportStats;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the export scheduler.
#[derive(Debug, Clone)]
pub struct ExportSchedulerConfig {
    /// Time between two export cycles. The first cycle runs one interval
    /// after start.
    pub interval: Duration,
    /// Timeout for awaiting the export task on stop.
    pub join_timeout: Duration,
}

impl ExportSchedulerConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval, ..Self::default() }
    }
}

impl Default for ExportSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(metricbridge_domain::constants::DEFAULT_TTL_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Periodic exporter with explicit lifecycle management.
pub struct ExportScheduler {
    cycle: Option<ExportCycle>,
    config: ExportSchedulerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    stats: Arc<ExportStats>,
}

impl ExportScheduler {
    /// Create a scheduler. Cancelling `cancellation` (or any parent of it)
    /// stops the loop.
    pub fn new(
        cycle: ExportCycle,
        config: ExportSchedulerConfig,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            cycle: Some(cycle),
            config,
            cancellation,
            task_handle: None,
            stats: Arc::new(ExportStats::new()),
        }
    }

    /// Start the export loop.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRunning` while the loop is active, `Exhausted` once
    /// it has been started before and `InvalidInterval` when the interval is
    /// zero or overflows the clock.
    #[instrument(skip(self), fields(interval = ?self.config.interval))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let interval = self.config.interval;
        let first_tick = first_tick(Instant::now(), interval)?;
        let cycle = self.cycle.take().ok_or(SchedulerError::Exhausted)?;

        let cancel = self.cancellation.clone();
        let stats = Arc::clone(&self.stats);
        let handle = tokio::spawn(async move {
            Self::export_loop(cycle, first_tick, interval, cancel, stats).await;
        });

        self.task_handle = Some(handle);
        info!("Export scheduler started");
        Ok(())
    }

    /// Stop the loop and wait for the task to finish.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the loop is not active, `Timeout` if the task
    /// does not finish within the join timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping export scheduler");
        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Export scheduler stopped");
        Ok(())
    }

    /// Returns true while the export task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Shared handle to the loop statistics.
    pub fn stats(&self) -> Arc<ExportStats> {
        Arc::clone(&self.stats)
    }

    /// Token that stops this scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    async fn export_loop(
        mut cycle: ExportCycle,
        first_tick: Instant,
        interval: Duration,
        cancel: CancellationToken,
        stats: Arc<ExportStats>,
    ) {
        let mut ticker = tokio::time::interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Export loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = cycle.run().await;
                    stats.record(&outcome, cycle.buffer().len());
                }
            }
        }

        let buffer = cycle.buffer();
        if !buffer.is_empty() {
            warn!(
                batches = buffer.len(),
                points = buffer.pending_points(),
                "Export loop exiting with undelivered batches"
            );
        }
    }
}

/// Deadline of the first tick. The ticker keeps adding `interval` to later
/// deadlines, so two intervals must fit on the clock.
fn first_tick(now: Instant, interval: Duration) -> SchedulerResult<Instant> {
    if interval.is_zero() {
        return Err(SchedulerError::InvalidInterval(interval));
    }
    interval
        .checked_mul(2)
        .and_then(|span| now.checked_add(span))
        .and_then(|_| now.checked_add(interval))
        .ok_or(SchedulerError::InvalidInterval(interval))
}

impl Drop for ExportScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ExportScheduler dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}
