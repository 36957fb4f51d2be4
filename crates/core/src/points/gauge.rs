//! Gauge samples → points

use chrono::{DateTime, Utc};
use metricbridge_domain::{GaugeSample, Point};

/// One point per gauge, value in the float `value` field.
pub fn points(hostname: &str, timestamp: DateTime<Utc>, samples: &[GaugeSample]) -> Vec<Point> {
    super::collect(
        "gauge",
        samples.iter().map(|sample| {
            super::base(&sample.name, &sample.labels, hostname, timestamp)
                .field("value", sample.value)
                .build()
        }),
    )
}
