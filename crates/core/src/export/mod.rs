//! Metric export: ports, retry buffering and the per-tick cycle.

pub mod cycle;
pub mod ports;
pub mod retry_buffer;

pub use cycle::{CycleOutcome, ExportCycle, ExportCycleConfig, RetryOutcome};
pub use ports::{MetricsSource, PingResponse, StoreClient, StoreConnector};
pub use retry_buffer::RetryBuffer;
