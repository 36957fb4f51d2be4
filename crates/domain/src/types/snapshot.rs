//! Point-in-time metric samples handed to the exporter.
//!
//! A [`Snapshot`] is produced once per export tick by a metrics source and is
//! never mutated afterwards. The exporter only reads it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label set attached to a sample. Ordered so converted points are
/// deterministic.
pub type Labels = BTreeMap<String, String>;

/* -------------------------------------------------------------------------- */
/* Samples */
/* -------------------------------------------------------------------------- */

/// Monotonic counter value at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSample {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    pub value: i64,
}

impl CounterSample {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self { name: name.into(), labels: Labels::new(), value }
    }

    /// Attach a label, replacing any existing value for `key`.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Last observed gauge value at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSample {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    pub value: f64,
}

impl GaugeSample {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), labels: Labels::new(), value }
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// One quantile estimate of a histogram (`quantile` in `0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

/// Distribution summary of a histogram at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSample {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub quantiles: Vec<Quantile>,
}

impl HistogramSample {
    /// Empty histogram with no observations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
            count: 0,
            sum: 0.0,
            min: 0.0,
            max: 0.0,
            quantiles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Arithmetic mean of the observations, `None` when nothing was recorded.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = self.count as f64;
            Some(self.sum / count)
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Snapshot */
/* -------------------------------------------------------------------------- */

/// Immutable point-in-time copy of every collected metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub counters: Vec<CounterSample>,
    #[serde(default)]
    pub gauges: Vec<GaugeSample>,
    #[serde(default)]
    pub histograms: Vec<HistogramSample>,
    /// Capture time in nanoseconds since the Unix epoch.
    pub time: i64,
}

impl Snapshot {
    /// Empty snapshot taken at `time` (nanoseconds since the epoch).
    pub fn empty(time: i64) -> Self {
        Self { time, ..Self::default() }
    }

    #[must_use]
    pub fn with_counter(mut self, sample: CounterSample) -> Self {
        self.counters.push(sample);
        self
    }

    #[must_use]
    pub fn with_gauge(mut self, sample: GaugeSample) -> Self {
        self.gauges.push(sample);
        self
    }

    #[must_use]
    pub fn with_histogram(mut self, sample: HistogramSample) -> Self {
        self.histograms.push(sample);
        self
    }

    /// Whether this snapshot should be exported at all.
    ///
    /// Only counters and gauges count. A snapshot holding nothing but
    /// histograms is skipped, although histograms ride along in the batch
    /// whenever the snapshot does qualify.
    pub fn is_send_worthy(&self) -> bool {
        !self.counters.is_empty() || !self.gauges.is_empty()
    }

    /// Capture time as wall-clock UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.time)
    }

    /// Total number of samples across all kinds.
    pub fn sample_count(&self) -> usize {
        self.counters.len() + self.gauges.len() + self.histograms.len()
    }
}
