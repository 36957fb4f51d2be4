//! Scheduling infrastructure for the periodic export loop
//!
//! The scheduler follows the runtime rules used across this crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on store writes and task joins

pub mod error;
pub mod export_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use export_scheduler::{ExportScheduler, ExportSchedulerConfig};
