//! Error types used throughout the bridge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for metricbridge
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Errors that abort registration; no export loop is started.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Connection(_) | Self::Unreachable(_))
    }

    /// Errors after which the failed batch is kept for a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_) | Self::Timeout(_))
    }

    /// Stable label for log fields and counters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Connection(_) => "connection",
            Self::Unreachable(_) => "unreachable",
            Self::Write(_) => "write",
            Self::Timeout(_) => "timeout",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_fatal_classification() {
        assert!(BridgeError::Config("x".into()).is_startup_fatal());
        assert!(BridgeError::Connection("x".into()).is_startup_fatal());
        assert!(BridgeError::Unreachable("x".into()).is_startup_fatal());
        assert!(!BridgeError::Write("x".into()).is_startup_fatal());
    }

    #[test]
    fn retryable_classification() {
        assert!(BridgeError::Write("x".into()).is_retryable());
        assert!(BridgeError::Timeout("x".into()).is_retryable());
        assert!(!BridgeError::Config("x".into()).is_retryable());
        assert!(!BridgeError::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_string(&BridgeError::Write("refused".into()))
            .expect("error should serialize");
        assert_eq!(json, r#"{"type":"Write","message":"refused"}"#);
    }

    #[test]
    fn labels_are_distinct_per_kind() {
        let labels = [
            BridgeError::Config("x".into()).label(),
            BridgeError::Connection("x".into()).label(),
            BridgeError::Unreachable("x".into()).label(),
            BridgeError::Write("x".into()).label(),
            BridgeError::Timeout("x".into()).label(),
            BridgeError::InvalidInput("x".into()).label(),
            BridgeError::Internal("x".into()).label(),
        ];
        let unique: std::collections::BTreeSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
        assert_eq!(BridgeError::Timeout("x".into()).label(), "timeout");
    }
}
