//! Configuration loader
//!
//! Loads the service configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `METRICBRIDGE_ADDRESS`: Store address (required)
//! - `METRICBRIDGE_USERNAME`: Store username
//! - `METRICBRIDGE_PASSWORD`: Store password
//! - `METRICBRIDGE_TIMEOUT_SECS`: Store connection and write timeout
//! - `METRICBRIDGE_TTL_SECS`: Export interval in seconds
//! - `METRICBRIDGE_DB`: Target database name
//! - `METRICBRIDGE_BUFFER_SIZE`: Retry buffer capacity in batches
//! - `METRICBRIDGE_LOG_LEVEL`: Log level filter
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./metricbridge.json` or `./metricbridge.toml` (current working
//!    directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable
//!
//! In a file the exporter block sits under
//! `extra_config."metricbridge/timeseries"`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use metricbridge_domain::{BridgeError, ExporterConfig, Result, ServiceConfig};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["metricbridge.json", "metricbridge.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing or a value is invalid, falls back to loading from a
/// config file.
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<ServiceConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `METRICBRIDGE_ADDRESS` is required; every other exporter option
/// falls back to its default.
///
/// # Errors
/// Returns `BridgeError::Config` if the address is missing, a numeric
/// variable does not parse, or the resulting exporter block is invalid.
pub fn load_from_env() -> Result<ServiceConfig> {
    let mut exporter = ExporterConfig::new(env_var("METRICBRIDGE_ADDRESS")?);
    exporter.username = optional_env_var("METRICBRIDGE_USERNAME");
    exporter.password = optional_env_var("METRICBRIDGE_PASSWORD");

    if let Some(timeout) = env_parse::<u64>("METRICBRIDGE_TIMEOUT_SECS")? {
        exporter.timeout_secs = timeout;
    }
    if let Some(ttl) = env_parse::<u64>("METRICBRIDGE_TTL_SECS")? {
        exporter.ttl_secs = ttl;
    }
    if let Some(db) = optional_env_var("METRICBRIDGE_DB") {
        exporter.db = db;
    }
    if let Some(buffer_size) = env_parse::<usize>("METRICBRIDGE_BUFFER_SIZE")? {
        exporter.buffer_size = buffer_size;
    }
    exporter.validate()?;

    let mut service = ServiceConfig::default().with_exporter(&exporter)?;
    if let Some(level) = optional_env_var("METRICBRIDGE_LOG_LEVEL") {
        service.logging.level = level;
    }
    Ok(service)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ServiceConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BridgeError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ServiceConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(BridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard locations for a configuration file
///
/// Searches the current working directory first, then the executable's
/// directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| BridgeError::Config(format!("Missing required environment variable: {key}")))
}

/// Get optional environment variable, treating empty values as unset.
fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse an optional environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| BridgeError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
