//! Per-file status tracking.
//!
//! Maps `"{isid}_{filename}"` to the current [`StatusRecord`] of a submitted
//! file. The orchestrator is the only writer; the progress endpoint reads.

mod config;
mod memory;
mod redis_tracker;
mod traits;
mod types;

use std::sync::Arc;
use std::time::Duration;

pub use config::{RedisTrackerConfig, TrackerBackend, TrackerConfig};
pub use memory::InMemoryTracker;
pub use redis_tracker::RedisTracker;
pub use traits::StatusTracker;
pub use types::{
    is_failure_status, owner_pattern, tracker_key, FileStatus, StatusRecord, TrackerError,
    FAILURE_PREFIX,
};

/// Build the configured tracker backend.
pub async fn create_tracker(
    config: &TrackerConfig,
) -> Result<Arc<dyn StatusTracker>, TrackerError> {
    match config.backend {
        TrackerBackend::Memory => Ok(Arc::new(InMemoryTracker::new(Duration::from_secs(
            config.failure_ttl_secs,
        )))),
        TrackerBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                TrackerError::Configuration(
                    "tracker.redis must be set when using the redis backend".to_string(),
                )
            })?;
            Ok(Arc::new(
                RedisTracker::connect(redis, config.failure_ttl_secs).await?,
            ))
        }
    }
}
