//! Counter samples → points

use chrono::{DateTime, Utc};
use metricbridge_domain::{CounterSample, Point};

/// One point per counter, value in the integer `count` field.
pub fn points(hostname: &str, timestamp: DateTime<Utc>, samples: &[CounterSample]) -> Vec<Point> {
    super::collect(
        "counter",
        samples.iter().map(|sample| {
            super::base(&sample.name, &sample.labels, hostname, timestamp)
                .field("count", sample.value)
                .build()
        }),
    )
}
