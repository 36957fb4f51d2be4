//! Metrics about the bridge itself

pub mod export_stats;

pub use export_stats::{ExportStats, ExportStatsSnapshot};
