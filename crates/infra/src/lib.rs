//! # metricbridge Infrastructure
//!
//! Infrastructure implementations of the core export ports.
//!
//! This crate contains:
//! - The tokio export scheduler and its registration entry point
//! - Configuration loading from environment and files
//! - Hostname resolution
//! - The in-process metrics registry and the in-memory store
//! - Tracing setup and export statistics
//!
//! ## Architecture
//! - Implements traits defined in `metricbridge-core`
//! - Contains all "impure" code (timers, I/O, platform lookups)

pub mod config;
pub mod observability;
pub mod platform;
pub mod registration;
pub mod scheduling;
pub mod store;

// Re-export commonly used items
pub use observability::{init_tracing, ExportStats, ExportStatsSnapshot, MetricsRegistry};
pub use registration::{register, RegistrationContext, PING_TIMEOUT};
pub use scheduling::{ExportScheduler, ExportSchedulerConfig, SchedulerError, SchedulerResult};
pub use store::InMemoryStore;
