//! Port interfaces for metric export
//!
//! These traits define the boundaries between the export loop and the
//! collector it reads from and the store it writes to.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metricbridge_domain::{Batch, Result, Snapshot, StoreSettings};

/// Source of point-in-time metric snapshots.
///
/// Called once per tick from the export task; implementations must return
/// quickly.
pub trait MetricsSource: Send + Sync {
    /// Copy the current state of every collected metric.
    fn snapshot(&self) -> Snapshot;
}

/// Reply to a store liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResponse {
    /// Round-trip time of the probe.
    pub latency: Duration,
    /// Free-form server identification (version string, banner, ...).
    pub message: String,
}

/// Client for the time-series store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Persist every point of `batch`. The batch succeeds or fails as a whole.
    async fn write(&self, batch: &Batch) -> Result<()>;

    /// Check the store is reachable within `timeout`.
    async fn ping(&self, timeout: Duration) -> Result<PingResponse>;
}

/// Factory that builds a store client from connection settings.
pub trait StoreConnector: Send + Sync {
    /// Build a client. Failing here aborts registration.
    fn connect(&self, settings: &StoreSettings) -> Result<Arc<dyn StoreClient>>;
}
