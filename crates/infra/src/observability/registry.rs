//! In-process metrics registry
//!
//! A small thread-safe collector that application code records into and the
//! export loop reads from through [`MetricsSource`].
//!
//! ## Design
//! - Series are keyed by name plus label set; snapshots come out sorted
//! - Histograms keep a **VecDeque ring buffer** of recent observations
//! - Poison-safe locking with explicit match (no `.expect()`)

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use metricbridge_core::MetricsSource;
use metricbridge_domain::{
    CounterSample, GaugeSample, HistogramSample, Labels, Quantile, Snapshot,
};

/// Observations kept per histogram series unless configured otherwise.
pub const DEFAULT_HISTOGRAM_WINDOW: usize = 1024;

/// Quantiles reported for every histogram.
pub const REPORTED_QUANTILES: [f64; 4] = [0.50, 0.90, 0.95, 0.99];

type SeriesKey = (String, Labels);

#[derive(Debug, Default)]
struct Series {
    counters: BTreeMap<SeriesKey, i64>,
    gauges: BTreeMap<SeriesKey, f64>,
    histograms: BTreeMap<SeriesKey, VecDeque<f64>>,
}

/// Thread-safe counter, gauge and histogram collector.
#[derive(Debug)]
pub struct MetricsRegistry {
    series: Mutex<Series>,
    window: usize,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_HISTOGRAM_WINDOW)
    }

    /// Registry whose histograms keep the last `window` observations
    /// (at least one).
    pub fn with_window(window: usize) -> Self {
        Self { series: Mutex::new(Series::default()), window: window.max(1) }
    }

    /// Add `delta` to a counter, creating it at zero first.
    pub fn increment_counter(&self, name: &str, labels: &[(&str, &str)], delta: i64) {
        let mut series = self.lock();
        let value = series.counters.entry(key(name, labels)).or_insert(0);
        *value = value.saturating_add(delta);
    }

    /// Replace a gauge value.
    pub fn set_gauge(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        self.lock().gauges.insert(key(name, labels), value);
    }

    /// Record one histogram observation, evicting the oldest past the window.
    pub fn record_histogram(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let window = self.window;
        let mut series = self.lock();
        let observations = series
            .histograms
            .entry(key(name, labels))
            .or_insert_with(|| VecDeque::with_capacity(window.min(64)));

        observations.push_back(value);
        if observations.len() > window {
            observations.pop_front();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Series> {
        match self.series.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "MetricsRegistry::series",
                    "Mutex poisoned during metrics access, recovering data"
                );
                poison_err.into_inner()
            }
        }
    }
}

impl MetricsSource for MetricsRegistry {
    fn snapshot(&self) -> Snapshot {
        let time = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let series = self.lock();

        Snapshot {
            counters: series
                .counters
                .iter()
                .map(|((name, labels), value)| CounterSample {
                    name: name.clone(),
                    labels: labels.clone(),
                    value: *value,
                })
                .collect(),
            gauges: series
                .gauges
                .iter()
                .map(|((name, labels), value)| GaugeSample {
                    name: name.clone(),
                    labels: labels.clone(),
                    value: *value,
                })
                .collect(),
            histograms: series
                .histograms
                .iter()
                .map(|((name, labels), observations)| summarize(name, labels, observations))
                .collect(),
            time,
        }
    }
}

fn key(name: &str, labels: &[(&str, &str)]) -> SeriesKey {
    let labels = labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    (name.to_string(), labels)
}

fn summarize(name: &str, labels: &Labels, observations: &VecDeque<f64>) -> HistogramSample {
    let mut sample = HistogramSample::new(name);
    sample.labels = labels.clone();

    if observations.is_empty() {
        return sample;
    }

    let mut sorted: Vec<f64> = observations.iter().copied().collect();
    sorted.sort_unstable_by(f64::total_cmp);

    sample.count = sorted.len() as u64;
    sample.sum = sorted.iter().sum();
    sample.min = sorted[0];
    sample.max = sorted[sorted.len() - 1];
    sample.quantiles = REPORTED_QUANTILES
        .iter()
        .map(|&quantile| Quantile { quantile, value: percentile(&sorted, quantile) })
        .collect();
    sample
}

/// Nearest-rank percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let index = ((sorted.len() as f64 * quantile) as usize).min(sorted.len() - 1);
    sorted[index]
}
