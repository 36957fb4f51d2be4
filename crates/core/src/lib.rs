//! # metricbridge Core
//!
//! Export logic with no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the metrics source and the time-series store
//! - Point converters for counters, gauges and histograms
//! - The bounded retry buffer
//! - The single-tick export cycle
//!
//! ## Architecture Principles
//! - Only depends on `metricbridge-domain`
//! - No network, filesystem or platform code
//! - Timers and cancellation belong to the infra layer

pub mod export;
pub mod points;

pub use export::{
    CycleOutcome, ExportCycle, ExportCycleConfig, MetricsSource, PingResponse, RetryBuffer,
    RetryOutcome, StoreClient, StoreConnector,
};
