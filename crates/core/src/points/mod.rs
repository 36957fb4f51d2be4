//! Point converters
//!
//! Pure functions turning snapshot samples into time-series points. Every
//! point is named after its sample, carries the sample labels as tags plus a
//! `host` tag, and is stamped with the snapshot time.
//!
//! Field layout per kind:
//! - counter: `count` (integer)
//! - gauge: `value` (float)
//! - histogram: `count`, `sum`, `min`, `max`, `mean`, one `p<percentile>`
//!   field per quantile

pub mod counter;
pub mod gauge;
pub mod histogram;

use chrono::{DateTime, Utc};
use metricbridge_domain::constants::HOST_TAG;
use metricbridge_domain::{Labels, Point, PointBuilder, Result, Snapshot};
use tracing::warn;

/// Convert a whole snapshot: counters first, then gauges, then histograms.
pub fn from_snapshot(hostname: &str, snapshot: &Snapshot) -> Vec<Point> {
    let timestamp = snapshot.timestamp();

    let mut points = counter::points(hostname, timestamp, &snapshot.counters);
    points.extend(gauge::points(hostname, timestamp, &snapshot.gauges));
    points.extend(histogram::points(hostname, timestamp, &snapshot.histograms));
    points
}

/// Builder pre-filled with the shared tag set and timestamp.
fn base(name: &str, labels: &Labels, hostname: &str, timestamp: DateTime<Utc>) -> PointBuilder {
    Point::builder(name).tags(labels).tag(HOST_TAG, hostname).timestamp(timestamp)
}

/// Keep built points, dropping (and logging) samples that cannot form one.
fn collect(kind: &'static str, built: impl Iterator<Item = Result<Point>>) -> Vec<Point> {
    built
        .filter_map(|result| match result {
            Ok(point) => Some(point),
            Err(err) => {
                warn!(kind, error = %err, "Dropping sample that cannot form a point");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use metricbridge_domain::{CounterSample, GaugeSample, HistogramSample};

    use super::*;

    #[test]
    fn snapshot_points_are_ordered_by_kind() {
        let snapshot = Snapshot::empty(1_700_000_000_000_000_000)
            .with_histogram(HistogramSample::new("latency"))
            .with_gauge(GaugeSample::new("cpu", 0.5))
            .with_counter(CounterSample::new("req", 5));

        let points = from_snapshot("node-01", &snapshot);
        let names: Vec<_> = points.iter().map(Point::measurement).collect();

        assert_eq!(names, vec!["req", "cpu", "latency"]);
        assert!(points.iter().all(|p| p.tag(HOST_TAG) == Some("node-01")));
        assert!(points.iter().all(|p| p.timestamp() == snapshot.timestamp()));
    }

    #[test]
    fn host_tag_overrides_sample_label() {
        let snapshot = Snapshot::empty(0)
            .with_counter(CounterSample::new("req", 1).with_label(HOST_TAG, "spoofed"));

        let points = from_snapshot("real", &snapshot);
        assert_eq!(points[0].tag(HOST_TAG), Some("real"));
    }

    #[test]
    fn unnamed_samples_are_dropped() {
        let snapshot = Snapshot::empty(0)
            .with_counter(CounterSample::new("", 1))
            .with_counter(CounterSample::new("ok", 1));

        let points = from_snapshot("h", &snapshot);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].measurement(), "ok");
    }
}
