//! Bridge constants
//!
//! Centralized location for defaults and fixed values shared by every crate.

// Configuration namespace inside `ServiceConfig::extra_config`
pub const EXPORTER_NAMESPACE: &str = "metricbridge/timeseries";

// Exporter defaults
pub const DEFAULT_TTL_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DATABASE: &str = "metrics";
pub const DEFAULT_BUFFER_SIZE: usize = 100;

// Exporter limits
pub const MAX_TTL_SECS: u64 = 86_400;
pub const MAX_TIMEOUT_SECS: u64 = 3_600;
pub const MAX_BUFFER_SIZE: usize = 100_000;

// Startup probe
pub const PING_TIMEOUT_MS: u64 = 1000;

// Point layout
pub const HOST_TAG: &str = "host";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
