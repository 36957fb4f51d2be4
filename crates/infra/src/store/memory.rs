//! In-memory time-series store
//!
//! Keeps accepted batches in process. Failure modes can be switched on at
//! runtime, so it doubles as the store for integration tests and for
//! embedding the exporter without a real backend.
//!
//! Clones share state: the client handed out by
//! [`StoreConnector::connect`] and the handle kept by the caller see the same
//! batches and the same failure switches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metricbridge_core::{PingResponse, StoreClient, StoreConnector};
use metricbridge_domain::{Batch, BridgeError, Point, Result, StoreSettings};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    batches: Vec<Batch>,
    write_attempts: usize,
    unavailable: bool,
    fail_next_writes: usize,
    ping_failure: Option<String>,
    connect_failure: Option<String>,
    write_delay: Option<Duration>,
    ping_delay: Option<Duration>,
    connections: Vec<StoreSettings>,
}

/// Store that records batches in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write and ping until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Reject the next `count` writes, then accept again.
    pub fn fail_next_writes(&self, count: usize) {
        self.state.lock().fail_next_writes = count;
    }

    /// Make pings fail with `message`; `None` restores normal pings.
    pub fn set_ping_failure(&self, message: Option<&str>) {
        self.state.lock().ping_failure = message.map(str::to_string);
    }

    /// Make [`StoreConnector::connect`] fail with `message`.
    pub fn set_connect_failure(&self, message: Option<&str>) {
        self.state.lock().connect_failure = message.map(str::to_string);
    }

    /// Hold every write for `delay` before answering.
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        self.state.lock().write_delay = delay;
    }

    /// Hold every ping for `delay` before answering.
    pub fn set_ping_delay(&self, delay: Option<Duration>) {
        self.state.lock().ping_delay = delay;
    }

    /// Accepted batches in write order.
    pub fn batches(&self) -> Vec<Batch> {
        self.state.lock().batches.clone()
    }

    /// Every accepted point, flattened across batches.
    pub fn points(&self) -> Vec<Point> {
        self.state.lock().batches.iter().flat_map(|b| b.points().iter().cloned()).collect()
    }

    /// Number of `write` calls, accepted or not.
    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }

    /// Settings passed to each successful `connect`, in order.
    pub fn connections(&self) -> Vec<StoreSettings> {
        self.state.lock().connections.clone()
    }

    /// Drop recorded batches; failure switches are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.batches.clear();
        state.write_attempts = 0;
    }

    fn check_write(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.write_attempts += 1;

        if state.unavailable {
            return Err(BridgeError::Write("in-memory store is unavailable".into()));
        }
        if state.fail_next_writes > 0 {
            state.fail_next_writes -= 1;
            return Err(BridgeError::Write("in-memory store rejected the batch".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn write(&self, batch: &Batch) -> Result<()> {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check_write()?;

        debug!(batch_id = %batch.id(), points = batch.len(), db = batch.database(), "batch stored");
        self.state.lock().batches.push(batch.clone());
        Ok(())
    }

    async fn ping(&self, _timeout: Duration) -> Result<PingResponse> {
        let started = Instant::now();
        let delay = self.state.lock().ping_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();

        if state.unavailable {
            return Err(BridgeError::Unreachable("in-memory store is unavailable".into()));
        }
        if let Some(message) = &state.ping_failure {
            return Err(BridgeError::Unreachable(message.clone()));
        }

        Ok(PingResponse {
            latency: started.elapsed(),
            message: format!("in-memory store, {} batches", state.batches.len()),
        })
    }
}

impl StoreConnector for InMemoryStore {
    fn connect(&self, settings: &StoreSettings) -> Result<Arc<dyn StoreClient>> {
        let mut state = self.state.lock();
        if let Some(message) = &state.connect_failure {
            return Err(BridgeError::Connection(message.clone()));
        }

        state.connections.push(settings.clone());
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use metricbridge_domain::BatchConfig;

    use super::*;

    fn batch() -> Batch {
        let point = Point::builder("req").field("count", 1_i64).build().expect("point");
        Batch::new(BatchConfig::new("metrics"), vec![point])
    }

    #[tokio::test]
    async fn records_accepted_batches() {
        let store = InMemoryStore::new();
        store.write(&batch()).await.expect("write succeeds");

        assert_eq!(store.batches().len(), 1);
        assert_eq!(store.points().len(), 1);
        assert_eq!(store.write_attempts(), 1);
    }

    #[tokio::test]
    async fn fail_next_writes_then_recovers() {
        let store = InMemoryStore::new();
        store.fail_next_writes(2);

        assert!(store.write(&batch()).await.is_err());
        assert!(store.write(&batch()).await.is_err());
        assert!(store.write(&batch()).await.is_ok());
        assert_eq!(store.batches().len(), 1);
        assert_eq!(store.write_attempts(), 3);
    }

    #[tokio::test]
    async fn unavailable_store_rejects_writes_and_pings() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);

        let write_err = store.write(&batch()).await.expect_err("write fails");
        assert!(write_err.is_retryable());
        let ping_err = store.ping(Duration::from_secs(1)).await.expect_err("ping fails");
        assert!(ping_err.is_startup_fatal());
    }

    #[tokio::test]
    async fn connected_client_shares_state() {
        let store = InMemoryStore::new();
        let settings = StoreSettings {
            address: "memory://".into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(5),
        };

        let client = store.connect(&settings).expect("connect succeeds");
        client.write(&batch()).await.expect("write succeeds");

        assert_eq!(store.batches().len(), 1);
        assert_eq!(store.connections(), vec![settings]);
    }

    #[test]
    fn connect_failure_is_startup_fatal() {
        let store = InMemoryStore::new();
        store.set_connect_failure(Some("bad address"));

        let settings = StoreSettings {
            address: "memory://".into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(5),
        };
        let err = store.connect(&settings).err().expect("connect fails");
        assert_eq!(err, BridgeError::Connection("bad address".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn ping_delay_holds_the_answer() {
        let store = InMemoryStore::new();
        store.set_ping_delay(Some(Duration::from_secs(3)));

        let response = store.ping(Duration::from_secs(1)).await.expect("ping succeeds");
        assert!(response.latency >= Duration::from_secs(3));
    }
}
