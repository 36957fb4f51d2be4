//! Metrics source fakes

use std::collections::VecDeque;

use metricbridge_core::MetricsSource;
use metricbridge_domain::{CounterSample, GaugeSample, HistogramSample, Snapshot};
use parking_lot::Mutex;

/// Fixed timestamp used by every fixture snapshot (2023-11-14T22:13:20Z).
pub const SNAPSHOT_TIME: i64 = 1_700_000_000_000_000_000;

/// Hands out queued snapshots in order, then empty snapshots forever.
#[derive(Default)]
pub struct QueuedSource {
    queue: Mutex<VecDeque<Snapshot>>,
    calls: Mutex<usize>,
}

impl QueuedSource {
    pub fn new(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        Self { queue: Mutex::new(snapshots.into_iter().collect()), calls: Mutex::new(0) }
    }

    pub fn push(&self, snapshot: Snapshot) {
        self.queue.lock().push_back(snapshot);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl MetricsSource for QueuedSource {
    fn snapshot(&self) -> Snapshot {
        *self.calls.lock() += 1;
        self.queue.lock().pop_front().unwrap_or_else(|| Snapshot::empty(SNAPSHOT_TIME))
    }
}

/// Snapshot with a single `req` counter.
pub fn counter_snapshot(value: i64) -> Snapshot {
    Snapshot::empty(SNAPSHOT_TIME).with_counter(CounterSample::new("req", value))
}

/// Snapshot with one sample of every kind.
pub fn mixed_snapshot() -> Snapshot {
    Snapshot::empty(SNAPSHOT_TIME)
        .with_counter(CounterSample::new("req", 5).with_label("route", "/api"))
        .with_gauge(GaugeSample::new("cpu", 0.42))
        .with_histogram(HistogramSample::new("latency"))
}

/// Snapshot that only carries histograms.
pub fn histogram_only_snapshot() -> Snapshot {
    let mut histogram = HistogramSample::new("latency");
    histogram.count = 3;
    histogram.sum = 6.0;
    Snapshot::empty(SNAPSHOT_TIME).with_histogram(histogram)
}
