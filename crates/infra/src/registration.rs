//! Exporter registration
//!
//! Wires configuration, store client, metrics source and host identity into a
//! running [`ExportScheduler`]. Every step here is startup-fatal: if any of
//! them fails, no loop is started and the error is returned to the caller.
//! Once the loop runs, per-cycle failures are absorbed by the loop itself.

use std::sync::Arc;
use std::time::Duration;

use metricbridge_core::{ExportCycle, ExportCycleConfig, MetricsSource, StoreConnector};
use metricbridge_domain::constants::{EXPORTER_NAMESPACE, PING_TIMEOUT_MS};
use metricbridge_domain::{lookup_exporter_config, BridgeError, ConfigLookup, Result, ServiceConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::platform::resolve_hostname;
use crate::scheduling::{ExportScheduler, ExportSchedulerConfig};

/// Fixed deadline for the startup liveness probe.
pub const PING_TIMEOUT: Duration = Duration::from_millis(PING_TIMEOUT_MS);

/// Everything [`register`] needs from the enclosing service.
pub struct RegistrationContext {
    /// Service-wide token; the export loop stops when it is cancelled.
    pub cancellation: CancellationToken,
    pub service: ServiceConfig,
    pub source: Arc<dyn MetricsSource>,
    pub connector: Arc<dyn StoreConnector>,
    /// Overrides hostname resolution when set.
    pub hostname: Option<String>,
}

impl RegistrationContext {
    pub fn new(
        cancellation: CancellationToken,
        service: ServiceConfig,
        source: Arc<dyn MetricsSource>,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self { cancellation, service, source, connector, hostname: None }
    }

    /// Use `hostname` for the `host` tag instead of asking the OS.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}

/// Validate configuration, connect, probe the store and start exporting.
///
/// # Errors
/// - `BridgeError::Config` when the exporter block is missing or invalid
/// - `BridgeError::Connection` when the store client cannot be built
/// - `BridgeError::Unreachable` when the startup ping fails or times out
/// - `BridgeError::Internal` when the scheduler cannot be started
#[instrument(skip(ctx), fields(service = %ctx.service.name))]
pub async fn register(ctx: RegistrationContext) -> Result<ExportScheduler> {
    let config = match lookup_exporter_config(&ctx.service)? {
        ConfigLookup::Found(config) => config,
        ConfigLookup::Missing => {
            debug!(namespace = EXPORTER_NAMESPACE, "no exporter config found");
            return Err(BridgeError::Config(format!(
                "missing {EXPORTER_NAMESPACE} config block"
            )));
        }
    };

    let client = ctx.connector.connect(&config.store_settings()).map_err(|err| {
        debug!(
            kind = err.label(),
            error = %err,
            address = %config.address,
            "unable to create the store client"
        );
        match err {
            BridgeError::Connection(_) => err,
            other => BridgeError::Connection(other.to_string()),
        }
    })?;

    let ping = match tokio::time::timeout(PING_TIMEOUT, client.ping(PING_TIMEOUT)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            error!(
                kind = err.label(),
                error = %err,
                address = %config.address,
                "unable to ping the store"
            );
            return Err(BridgeError::Unreachable(err.to_string()));
        }
        Err(_) => {
            error!(address = %config.address, timeout = ?PING_TIMEOUT, "store ping timed out");
            return Err(BridgeError::Unreachable(format!(
                "ping to {} exceeded {PING_TIMEOUT:?}",
                config.address
            )));
        }
    };
    debug!(latency = ?ping.latency, message = %ping.message, "store ping succeeded");

    let hostname = ctx.hostname.unwrap_or_else(resolve_hostname);

    let cycle = ExportCycle::new(
        ctx.source,
        client,
        ExportCycleConfig {
            hostname,
            batch_config: config.batch_config(),
            buffer_size: config.buffer_size,
            write_timeout: Some(config.timeout()),
        },
    );

    let mut scheduler = ExportScheduler::new(
        cycle,
        ExportSchedulerConfig::new(config.ttl()),
        ctx.cancellation.child_token(),
    );
    scheduler.start().await?;

    info!(
        address = %config.address,
        db = %config.db,
        ttl = ?config.ttl(),
        buffer_size = config.buffer_size,
        "time-series exporter running"
    );
    Ok(scheduler)
}
