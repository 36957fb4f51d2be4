//! Scheduler error types

use std::time::Duration;

use metricbridge_domain::BridgeError;
use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// The export loop already ran and gave up its state
    #[error("Scheduler cannot be restarted after it has stopped")]
    Exhausted,

    /// Interval is zero or too large to schedule
    #[error("Export interval {0:?} cannot be scheduled")]
    InvalidInterval(Duration),

    /// Export loop did not finish within the join timeout
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: tokio::time::error::Elapsed,
    },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(#[from] tokio::task::JoinError),
}

impl From<SchedulerError> for BridgeError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidInterval(_) => BridgeError::Config(err.to_string()),
            other => BridgeError::Internal(other.to_string()),
        }
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
