//! Observability infrastructure
//!
//! - [`logging`]: tracing subscriber installation
//! - [`metrics`]: counters describing the export loop
//! - [`registry`]: in-process collector feeding the export loop

pub mod logging;
pub mod metrics;
pub mod registry;

pub use logging::init_tracing;
pub use metrics::{ExportStats, ExportStatsSnapshot};
pub use registry::MetricsRegistry;
