//! Translation task queue.
//!
//! Two interchangeable backends share one at-least-once contract: a taken
//! task is leased, and is handed out again unless acknowledged before the
//! lease runs out.

mod channel;
mod config;
mod redis_queue;
mod traits;
mod types;

use std::sync::Arc;
use std::time::Duration;

pub use channel::ChannelQueue;
pub use config::{QueueBackend, QueueConfig, RedisQueueConfig};
pub use redis_queue::RedisQueue;
pub use traits::TranslateQueue;
pub use types::{Delivery, QueueError, TranslateTask};

/// Build the configured queue backend.
pub async fn create_queue(config: &QueueConfig) -> Result<Arc<dyn TranslateQueue>, QueueError> {
    match config.backend {
        QueueBackend::Channel => Ok(Arc::new(ChannelQueue::from_config(config))),
        QueueBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                QueueError::Configuration(
                    "queue.redis must be set when using the redis backend".to_string(),
                )
            })?;
            let queue = RedisQueue::connect(redis, Duration::from_secs(config.lease_secs)).await?;
            Ok(Arc::new(queue))
        }
    }
}
