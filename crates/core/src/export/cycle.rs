//! Single export cycle
//!
//! [`ExportCycle`] holds everything one tick needs: the metrics source, the
//! store client, the retry buffer and the host tag resolved at startup. The
//! scheduler in the infra layer owns one cycle and calls [`ExportCycle::run`]
//! on every tick; nothing in here knows about timers or cancellation.
//!
//! Sequencing per tick:
//! 1. snapshot; skip when there are no counters and no gauges, or when no
//!    sample converts into a point
//! 2. convert and write the new batch
//! 3. on failure buffer the batch and stop
//! 4. on success write every buffered point as one combined batch, clearing
//!    the buffer only when that write succeeds

use std::sync::Arc;
use std::time::Duration;

use metricbridge_domain::{Batch, BatchConfig, BridgeError, Result};
use tracing::{debug, error, info, warn};

use super::ports::{MetricsSource, StoreClient};
use super::retry_buffer::RetryBuffer;
use crate::points;

/// Static inputs for an [`ExportCycle`].
#[derive(Debug, Clone)]
pub struct ExportCycleConfig {
    /// Value of the `host` tag. May be empty when resolution failed.
    pub hostname: String,
    pub batch_config: BatchConfig,
    /// Retry buffer capacity in batches.
    pub buffer_size: usize,
    /// Upper bound for a single store write. `None` waits indefinitely.
    pub write_timeout: Option<Duration>,
}

/// What happened to the buffered batches after a successful primary write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// Nothing was buffered.
    Idle,
    /// Every buffered batch was written and the buffer cleared.
    Flushed { batches: usize, points: usize },
    /// The combined retry write failed; the buffer is unchanged.
    Failed { batches: usize, points: usize, error: BridgeError },
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Snapshot had no counters and no gauges, or none of its samples
    /// converted into a point; nothing was written.
    Skipped,
    /// The new batch was written.
    Sent { points: usize, retry: RetryOutcome },
    /// The new batch failed and now sits in the retry buffer.
    Buffered { points: usize, evicted: Vec<Batch>, error: BridgeError },
}

impl CycleOutcome {
    /// Points accepted by the store this tick, retried points included.
    pub fn points_sent(&self) -> usize {
        match self {
            Self::Sent { points, retry: RetryOutcome::Flushed { points: retried, .. } } => {
                points + retried
            }
            Self::Sent { points, .. } => *points,
            Self::Skipped | Self::Buffered { .. } => 0,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// One tick's worth of export work plus the state carried between ticks.
pub struct ExportCycle {
    source: Arc<dyn MetricsSource>,
    store: Arc<dyn StoreClient>,
    buffer: RetryBuffer,
    hostname: String,
    batch_config: BatchConfig,
    write_timeout: Option<Duration>,
}

impl ExportCycle {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        store: Arc<dyn StoreClient>,
        config: ExportCycleConfig,
    ) -> Self {
        Self {
            source,
            store,
            buffer: RetryBuffer::new(config.buffer_size),
            hostname: config.hostname,
            batch_config: config.batch_config,
            write_timeout: config.write_timeout,
        }
    }

    pub fn buffer(&self) -> &RetryBuffer {
        &self.buffer
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Run one export cycle. Never fails; every error ends up in the outcome.
    pub async fn run(&mut self) -> CycleOutcome {
        debug!("preparing metrics snapshot");
        let snapshot = self.source.snapshot();

        if !snapshot.is_send_worthy() {
            debug!("no metrics data to send");
            return CycleOutcome::Skipped;
        }

        let batch =
            Batch::new(self.batch_config.clone(), points::from_snapshot(&self.hostname, &snapshot));
        if batch.is_empty() {
            warn!(samples = snapshot.sample_count(), "no sample converted into a point");
            return CycleOutcome::Skipped;
        }
        let points = batch.len();

        if let Err(err) = self.write(&batch).await {
            error!(
                batch_id = %batch.id(),
                points,
                kind = err.label(),
                error = %err,
                "writing metrics batch failed"
            );
            let evicted = self.buffer.add([batch]);
            if !evicted.is_empty() {
                let lost: usize = evicted.iter().map(Batch::len).sum();
                warn!(
                    batches = evicted.len(),
                    points = lost,
                    pending = self.buffer.pending_points(),
                    "retry buffer full, dropped oldest batches"
                );
            }
            return CycleOutcome::Buffered { points, evicted, error: err };
        }

        info!(points, "{points} datapoints sent");

        let retry = self.flush_pending().await;
        CycleOutcome::Sent { points, retry }
    }

    /// Write every buffered point as one batch.
    async fn flush_pending(&mut self) -> RetryOutcome {
        if self.buffer.is_empty() {
            return RetryOutcome::Idle;
        }

        let batches = self.buffer.len();
        let combined = Batch::combine(self.batch_config.clone(), self.buffer.elements());
        let points = combined.len();

        match self.write(&combined).await {
            Ok(()) => {
                self.buffer.clear();
                info!(batches, points, "buffered datapoints sent");
                RetryOutcome::Flushed { batches, points }
            }
            Err(err) => {
                error!(
                    batches,
                    points,
                    kind = err.label(),
                    error = %err,
                    "retrying buffered datapoints failed"
                );
                RetryOutcome::Failed { batches, points, error: err }
            }
        }
    }

    async fn write(&self, batch: &Batch) -> Result<()> {
        let Some(limit) = self.write_timeout else {
            return self.store.write(batch).await;
        };

        match tokio::time::timeout(limit, self.store.write(batch)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout(format!("store write exceeded {limit:?}"))),
        }
    }
}
