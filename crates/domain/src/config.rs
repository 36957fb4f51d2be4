//! Configuration management
//!
//! A [`ServiceConfig`] carries service-wide settings plus an `extra_config`
//! map of namespace → raw JSON block. Each component looks up its own block;
//! the exporter's lives under [`EXPORTER_NAMESPACE`] and is resolved with
//! [`lookup_exporter_config`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DATABASE, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TTL_SECS, EXPORTER_NAMESPACE, MAX_BUFFER_SIZE, MAX_TIMEOUT_SECS, MAX_TTL_SECS,
};
use crate::errors::{BridgeError, Result};
use crate::types::BatchConfig;

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-component configuration blocks keyed by namespace.
    #[serde(default)]
    pub extra_config: BTreeMap<String, serde_json::Value>,
}

impl ServiceConfig {
    /// Store `exporter` under the exporter namespace, replacing any previous
    /// block.
    ///
    /// # Errors
    /// Returns `BridgeError::Config` if the block cannot be encoded.
    pub fn with_exporter(mut self, exporter: &ExporterConfig) -> Result<Self> {
        let value = serde_json::to_value(exporter)
            .map_err(|e| BridgeError::Config(format!("Cannot encode exporter config: {e}")))?;
        self.extra_config.insert(EXPORTER_NAMESPACE.to_string(), value);
        Ok(self)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::default() }
    }
}

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Time-series exporter configuration block.
///
/// Durations are expressed in whole seconds on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(rename = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(rename = "ttl", default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_database")]
    pub db: String,
    #[serde(rename = "bufferSize", alias = "buffer_size", default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl ExporterConfig {
    /// Config for `address` with every other option at its default.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ttl_secs: DEFAULT_TTL_SECS,
            db: DEFAULT_DATABASE.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Store connection and write timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Export tick interval.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Check the block is usable.
    ///
    /// # Errors
    /// Returns `BridgeError::Config` naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(BridgeError::Config("exporter address is empty".into()));
        }
        if self.db.trim().is_empty() {
            return Err(BridgeError::Config("exporter db is empty".into()));
        }
        if !(1..=MAX_TTL_SECS).contains(&self.ttl_secs) {
            return Err(BridgeError::Config(format!(
                "exporter ttl must be between 1 and {MAX_TTL_SECS} seconds, got {}",
                self.ttl_secs
            )));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(BridgeError::Config(format!(
                "exporter timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {}",
                self.timeout_secs
            )));
        }
        if !(1..=MAX_BUFFER_SIZE).contains(&self.buffer_size) {
            return Err(BridgeError::Config(format!(
                "exporter bufferSize must be between 1 and {MAX_BUFFER_SIZE}, got {}",
                self.buffer_size
            )));
        }
        Ok(())
    }

    /// Connection settings handed to a store connector.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            address: self.address.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.timeout(),
        }
    }

    /// Destination metadata for every batch built by the exporter.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::new(self.db.clone())
    }
}

impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("ttl_secs", &self.ttl_secs)
            .field("db", &self.db)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

/// Connection settings for a store client.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Outcome of looking up the exporter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLookup {
    Found(ExporterConfig),
    Missing,
}

/// Resolve the exporter block from `service`.
///
/// # Errors
/// Returns `BridgeError::Config` when the block exists but cannot be decoded
/// or fails [`ExporterConfig::validate`]. An absent block is not an error
/// here; callers decide what `Missing` means.
pub fn lookup_exporter_config(service: &ServiceConfig) -> Result<ConfigLookup> {
    let Some(raw) = service.extra_config.get(EXPORTER_NAMESPACE) else {
        return Ok(ConfigLookup::Missing);
    };

    let config: ExporterConfig = serde_json::from_value(raw.clone()).map_err(|e| {
        BridgeError::Config(format!("Invalid {EXPORTER_NAMESPACE} config block: {e}"))
    })?;
    config.validate()?;

    Ok(ConfigLookup::Found(config))
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn service_with(block: serde_json::Value) -> ServiceConfig {
        let mut service = ServiceConfig::default();
        service.extra_config.insert(EXPORTER_NAMESPACE.to_string(), block);
        service
    }

    #[test]
    fn missing_block_is_reported_as_missing() {
        let lookup = lookup_exporter_config(&ServiceConfig::default()).expect("lookup succeeds");
        assert_eq!(lookup, ConfigLookup::Missing);
    }

    #[test]
    fn block_with_only_address_uses_defaults() {
        let service = service_with(json!({ "address": "http://localhost:8086" }));

        let ConfigLookup::Found(config) = lookup_exporter_config(&service).expect("lookup") else {
            panic!("expected config to be found");
        };

        assert_eq!(config.ttl(), Duration::from_secs(DEFAULT_TTL_SECS));
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.db, DEFAULT_DATABASE);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn block_recognizes_every_option() {
        let service = service_with(json!({
            "address": "http://store:8086",
            "username": "writer",
            "password": "secret",
            "timeout": 2,
            "ttl": 15,
            "db": "edge",
            "bufferSize": 7
        }));

        let ConfigLookup::Found(config) = lookup_exporter_config(&service).expect("lookup") else {
            panic!("expected config to be found");
        };

        assert_eq!(config.username.as_deref(), Some("writer"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.ttl_secs, 15);
        assert_eq!(config.db, "edge");
        assert_eq!(config.buffer_size, 7);
        assert_eq!(config.batch_config().database, "edge");
    }

    #[test]
    fn malformed_block_is_config_error() {
        let service = service_with(json!({ "address": 42 }));
        let err = lookup_exporter_config(&service).expect_err("should fail");
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let service = service_with(json!({ "address": "http://store", "bufferSize": 0 }));
        let err = lookup_exporter_config(&service).expect_err("should fail");
        assert!(err.to_string().contains("bufferSize"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for (block, option) in [
            (json!({ "address": "http://store", "ttl": u64::MAX }), "ttl"),
            (json!({ "address": "http://store", "ttl": MAX_TTL_SECS + 1 }), "ttl"),
            (json!({ "address": "http://store", "timeout": MAX_TIMEOUT_SECS + 1 }), "timeout"),
            (json!({ "address": "http://store", "bufferSize": MAX_BUFFER_SIZE + 1 }), "bufferSize"),
        ] {
            let err = lookup_exporter_config(&service_with(block)).expect_err("should fail");
            assert!(matches!(err, BridgeError::Config(_)));
            assert!(err.to_string().contains(option), "{err} should name {option}");
        }
    }

    #[test]
    fn limits_themselves_are_accepted() {
        let service = service_with(json!({
            "address": "http://store",
            "ttl": MAX_TTL_SECS,
            "timeout": MAX_TIMEOUT_SECS,
            "bufferSize": MAX_BUFFER_SIZE,
        }));
        assert!(matches!(lookup_exporter_config(&service), Ok(ConfigLookup::Found(_))));
    }

    #[test]
    fn with_exporter_round_trips_through_lookup() {
        let mut exporter = ExporterConfig::new("http://store:8086");
        exporter.password = Some("secret".into());
        let service = ServiceConfig::default().with_exporter(&exporter).expect("encode");

        let lookup = lookup_exporter_config(&service).expect("lookup");
        assert_eq!(lookup, ConfigLookup::Found(exporter));
    }

    #[test]
    fn debug_output_redacts_password() {
        let mut exporter = ExporterConfig::new("http://store:8086");
        exporter.password = Some("hunter2".into());

        assert!(!format!("{exporter:?}").contains("hunter2"));
        assert!(!format!("{:?}", exporter.store_settings()).contains("hunter2"));
    }
}
