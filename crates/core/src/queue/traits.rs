use async_trait::async_trait;

use super::types::{Delivery, QueueError, TranslateTask};

/// FIFO channel of translation tasks with at-least-once delivery.
#[async_trait]
pub trait TranslateQueue: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &str;

    /// Enqueue a task.
    async fn add(&self, task: TranslateTask) -> Result<(), QueueError>;

    /// Lease the next task, waiting up to the backend's bounded timeout.
    ///
    /// Returns `Ok(None)` when nothing became available in time.
    async fn take(&self) -> Result<Option<Delivery>, QueueError>;

    /// Acknowledge a delivery so it is not handed out again.
    ///
    /// Acknowledging an unknown or already-acknowledged token is not an error.
    async fn delete(&self, ack_token: &str) -> Result<(), QueueError>;

    /// Number of tasks waiting to be taken (excludes leased tasks).
    async fn pending(&self) -> Result<usize, QueueError>;
}
