//! Export loop statistics
//!
//! Lock-free counters updated by the export task after every cycle and read
//! from any thread. Values are monotonic except `buffer_depth`, which mirrors
//! the retry buffer after the most recent cycle.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use metricbridge_core::{CycleOutcome, RetryOutcome};
use serde::Serialize;

/// Running totals for one export loop.
#[derive(Debug, Default)]
pub struct ExportStats {
    cycles: AtomicU64,
    skipped: AtomicU64,
    points_sent: AtomicU64,
    write_failures: AtomicU64,
    retry_points_flushed: AtomicU64,
    retry_failures: AtomicU64,
    evicted_batches: AtomicU64,
    buffer_depth: AtomicUsize,
}

/// Point-in-time copy of [`ExportStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStatsSnapshot {
    pub cycles: u64,
    pub skipped: u64,
    pub points_sent: u64,
    pub write_failures: u64,
    pub retry_points_flushed: u64,
    pub retry_failures: u64,
    pub evicted_batches: u64,
    pub buffer_depth: usize,
}

impl ExportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle outcome into the totals.
    pub fn record(&self, outcome: &CycleOutcome, buffer_depth: usize) {
        // Relaxed OK: counters are independent, no derived metrics
        self.cycles.fetch_add(1, Ordering::Relaxed);

        match outcome {
            CycleOutcome::Skipped => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            CycleOutcome::Sent { points, retry } => {
                self.points_sent.fetch_add(as_u64(*points), Ordering::Relaxed);
                match retry {
                    RetryOutcome::Idle => {}
                    RetryOutcome::Flushed { points, .. } => {
                        self.retry_points_flushed.fetch_add(as_u64(*points), Ordering::Relaxed);
                    }
                    RetryOutcome::Failed { .. } => {
                        self.retry_failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            CycleOutcome::Buffered { evicted, .. } => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                self.evicted_batches.fetch_add(as_u64(evicted.len()), Ordering::Relaxed);
            }
        }

        self.buffer_depth.store(buffer_depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExportStatsSnapshot {
        ExportStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            points_sent: self.points_sent.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            retry_points_flushed: self.retry_points_flushed.load(Ordering::Relaxed),
            retry_failures: self.retry_failures.load(Ordering::Relaxed),
            evicted_batches: self.evicted_batches.load(Ordering::Relaxed),
            buffer_depth: self.buffer_depth.load(Ordering::Relaxed),
        }
    }
}

fn as_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
