//! # metricbridge Domain
//!
//! Domain types and models for the metrics bridge.
//!
//! This crate contains:
//! - Metric samples and snapshots handed over by a metrics source
//! - Time-series points and write batches
//! - Exporter and service configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other metricbridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
