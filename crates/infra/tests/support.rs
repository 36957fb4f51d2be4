//! Shared fixtures for `metricbridge-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use metricbridge_domain::{ExporterConfig, ServiceConfig};
use metricbridge_infra::{InMemoryStore, MetricsRegistry, RegistrationContext};
use tokio_util::sync::CancellationToken;

/// Export interval used by every fixture config.
pub const TTL: Duration = Duration::from_secs(10);

/// Fixed host tag so assertions do not depend on the machine.
pub const HOSTNAME: &str = "test-host";

/// Exporter block with a short interval and the given buffer capacity.
pub fn exporter_config(buffer_size: usize) -> ExporterConfig {
    let mut config = ExporterConfig::new("memory://local");
    config.ttl_secs = TTL.as_secs();
    config.timeout_secs = 1;
    config.buffer_size = buffer_size;
    config
}

pub fn service_config(exporter: &ExporterConfig) -> ServiceConfig {
    ServiceConfig { name: "integration".into(), ..ServiceConfig::default() }
        .with_exporter(exporter)
        .expect("exporter block encodes")
}

/// Everything a registration test needs to drive and observe the exporter.
pub struct Fixture {
    pub cancellation: CancellationToken,
    pub registry: Arc<MetricsRegistry>,
    pub store: InMemoryStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            registry: Arc::new(MetricsRegistry::new()),
            store: InMemoryStore::new(),
        }
    }

    pub fn context(&self, service: ServiceConfig) -> RegistrationContext {
        RegistrationContext::new(
            self.cancellation.clone(),
            service,
            self.registry.clone(),
            Arc::new(self.store.clone()),
        )
        .with_hostname(HOSTNAME)
    }
}

/// Let spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock past the next `n` ticks.
pub async fn advance_ticks(n: u32) {
    tokio::time::sleep(TTL * n + Duration::from_millis(1)).await;
    settle().await;
}
