//! Mock queue for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::queue::{ChannelQueue, Delivery, QueueError, TranslateQueue, TranslateTask};

/// In-process queue that records every task added and can fail on demand.
#[derive(Clone)]
pub struct MockQueue {
    inner: Arc<ChannelQueue>,
    added: Arc<RwLock<Vec<TranslateTask>>>,
    acked: Arc<RwLock<Vec<String>>>,
    next_add_error: Arc<RwLock<Option<QueueError>>>,
}

impl Default for MockQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ChannelQueue::new(
                1024,
                Duration::from_millis(10),
                Duration::from_secs(60),
            )),
            added: Arc::new(RwLock::new(Vec::new())),
            acked: Arc::new(RwLock::new(Vec::new())),
            next_add_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next `add` to fail with the given error.
    pub async fn set_next_add_error(&self, error: QueueError) {
        *self.next_add_error.write().await = Some(error);
    }

    /// Tasks accepted by `add`, in order.
    pub async fn added(&self) -> Vec<TranslateTask> {
        self.added.read().await.clone()
    }

    /// Ack tokens passed to `delete`, in order.
    pub async fn acked(&self) -> Vec<String> {
        self.acked.read().await.clone()
    }

    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight().await
    }
}

#[async_trait]
impl TranslateQueue for MockQueue {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add(&self, task: TranslateTask) -> Result<(), QueueError> {
        if let Some(error) = self.next_add_error.write().await.take() {
            return Err(error);
        }
        self.inner.add(task.clone()).await?;
        self.added.write().await.push(task);
        Ok(())
    }

    async fn take(&self) -> Result<Option<Delivery>, QueueError> {
        self.inner.take().await
    }

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError> {
        self.acked.write().await.push(ack_token.to_string());
        self.inner.delete(ack_token).await
    }

    async fn pending(&self) -> Result<usize, QueueError> {
        self.inner.pending().await
    }
}
