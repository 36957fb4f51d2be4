//! Histogram samples → points

use chrono::{DateTime, Utc};
use metricbridge_domain::{HistogramSample, Point};

/// One point per histogram carrying the summary statistics and quantiles.
pub fn points(
    hostname: &str,
    timestamp: DateTime<Utc>,
    samples: &[HistogramSample],
) -> Vec<Point> {
    super::collect(
        "histogram",
        samples.iter().map(|sample| {
            let mut builder = super::base(&sample.name, &sample.labels, hostname, timestamp)
                .field("count", sample.count)
                .field("sum", sample.sum)
                .field("min", sample.min)
                .field("max", sample.max);

            if let Some(mean) = sample.mean() {
                builder = builder.field("mean", mean);
            }
            for quantile in &sample.quantiles {
                builder = builder.field(quantile_field(quantile.quantile), quantile.value);
            }

            builder.build()
        }),
    )
}

/// `0.5` → `p50`, `0.999` → `p99.9`.
fn quantile_field(quantile: f64) -> String {
    let percentile = (quantile * 100_000.0).round() / 1000.0;
    format!("p{percentile}")
}
