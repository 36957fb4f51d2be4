//! Store client fakes

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use metricbridge_core::{PingResponse, StoreClient};
use metricbridge_domain::{Batch, BridgeError, Result};
use parking_lot::Mutex;

/// Scripted reply for one write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReply {
    Accept,
    Reject,
    /// Never completes within any sensible timeout.
    Hang,
}

/// Store whose write results are scripted per call.
///
/// Unscripted calls are accepted. Every call is recorded, whether or not it
/// succeeded.
#[derive(Default)]
pub struct ScriptedStore {
    replies: Mutex<VecDeque<WriteReply>>,
    attempts: Mutex<Vec<Batch>>,
    accepted: Mutex<Vec<Batch>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, replies: impl IntoIterator<Item = WriteReply>) {
        self.replies.lock().extend(replies);
    }

    /// Every batch passed to `write`, in call order.
    pub fn attempts(&self) -> Vec<Batch> {
        self.attempts.lock().clone()
    }

    /// Batches that were accepted, in call order.
    pub fn accepted(&self) -> Vec<Batch> {
        self.accepted.lock().clone()
    }
}

#[async_trait]
impl StoreClient for ScriptedStore {
    async fn write(&self, batch: &Batch) -> Result<()> {
        self.attempts.lock().push(batch.clone());
        let reply = self.replies.lock().pop_front().unwrap_or(WriteReply::Accept);

        match reply {
            WriteReply::Accept => {
                self.accepted.lock().push(batch.clone());
                Ok(())
            }
            WriteReply::Reject => Err(BridgeError::Write("store rejected batch".into())),
            WriteReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }

    async fn ping(&self, _timeout: Duration) -> Result<PingResponse> {
        Ok(PingResponse { latency: Duration::ZERO, message: "scripted".into() })
    }
}
