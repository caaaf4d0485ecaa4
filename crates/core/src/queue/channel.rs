//! In-process queue backed by a bounded tokio channel.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::QueueConfig;
use super::traits::TranslateQueue;
use super::types::{Delivery, QueueError, TranslateTask};

/// A task handed out but not yet acknowledged.
#[derive(Debug)]
struct Lease {
    task: TranslateTask,
    attempt: u32,
    expires_at: Instant,
}

/// Buffered in-process queue.
///
/// Strict FIFO while every delivery is acknowledged. A delivery whose lease
/// runs out is handed out again ahead of the channel.
pub struct ChannelQueue {
    tx: mpsc::Sender<TranslateTask>,
    rx: Mutex<mpsc::Receiver<TranslateTask>>,
    leases: Mutex<HashMap<String, Lease>>,
    take_timeout: Duration,
    lease: Duration,
}

impl ChannelQueue {
    pub fn new(capacity: usize, take_timeout: Duration, lease: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
            leases: Mutex::new(HashMap::new()),
            take_timeout,
            lease,
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_millis(config.take_timeout_ms),
            Duration::from_secs(config.lease_secs),
        )
    }

    /// Number of deliveries currently leased.
    pub async fn in_flight(&self) -> usize {
        self.leases.lock().await.len()
    }

    async fn lease(&self, task: TranslateTask, attempt: u32) -> Delivery {
        let ack_token = uuid::Uuid::new_v4().to_string();
        self.leases.lock().await.insert(
            ack_token.clone(),
            Lease {
                task: task.clone(),
                attempt,
                expires_at: Instant::now() + self.lease,
            },
        );
        Delivery {
            task,
            ack_token,
            attempt,
        }
    }

    /// Pull back the oldest expired lease, if any.
    async fn reclaim_expired(&self) -> Option<(TranslateTask, u32)> {
        let mut leases = self.leases.lock().await;
        let now = Instant::now();
        let token = leases
            .iter()
            .filter(|(_, lease)| lease.expires_at <= now)
            .min_by_key(|(_, lease)| lease.expires_at)
            .map(|(token, _)| token.clone())?;
        let lease = leases.remove(&token)?;
        debug!(
            "Lease expired for {}/{} (attempt {}), redelivering",
            lease.task.isid, lease.task.filename, lease.attempt
        );
        Some((lease.task, lease.attempt))
    }
}

#[async_trait]
impl TranslateQueue for ChannelQueue {
    fn name(&self) -> &str {
        "channel"
    }

    async fn add(&self, task: TranslateTask) -> Result<(), QueueError> {
        self.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full(self.tx.max_capacity()),
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    async fn take(&self) -> Result<Option<Delivery>, QueueError> {
        if let Some((task, attempt)) = self.reclaim_expired().await {
            return Ok(Some(self.lease(task, attempt + 1).await));
        }

        let mut rx = self.rx.lock().await;
        match tokio::time::timeout(self.take_timeout, rx.recv()).await {
            Ok(Some(task)) => {
                drop(rx);
                Ok(Some(self.lease(task, 1).await))
            }
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError> {
        if self.leases.lock().await.remove(ack_token).is_none() {
            warn!("Acknowledged unknown delivery token {}", ack_token);
        }
        Ok(())
    }

    async fn pending(&self) -> Result<usize, QueueError> {
        Ok(self.tx.max_capacity() - self.tx.capacity())
    }
}
