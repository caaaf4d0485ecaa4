//! Queue configuration.

use serde::{Deserialize, Serialize};

/// Available queue backends.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    /// In-process buffered channel. Tasks are lost on restart.
    #[default]
    Channel,
    /// Redis-backed FIFO shared between processes.
    Redis,
}

/// Configuration for the translation task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackend,

    /// Buffer size of the in-process channel.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// How long `take` waits on the in-process channel (milliseconds).
    #[serde(default = "default_take_timeout")]
    pub take_timeout_ms: u64,

    /// How long a taken task stays invisible before it is handed out again.
    #[serde(default = "default_lease")]
    pub lease_secs: u64,

    /// Redis settings (required when backend = "redis").
    #[serde(default)]
    pub redis: Option<RedisQueueConfig>,
}

fn default_capacity() -> usize {
    1024
}

fn default_take_timeout() -> u64 {
    100
}

fn default_lease() -> u64 {
    900 // 15 minutes
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            capacity: default_capacity(),
            take_timeout_ms: default_take_timeout(),
            lease_secs: default_lease(),
            redis: None,
        }
    }
}

/// Redis queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisQueueConfig {
    /// Connection URL, e.g. "redis://localhost:6379".
    pub url: String,

    /// Key namespace shared by all queues of this deployment.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Ordering group. FIFO holds only within one group.
    #[serde(default = "default_group")]
    pub group: String,

    /// Long-poll window for `take` (seconds).
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Sleep between empty polls inside the long-poll window (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_namespace() -> String {
    "doctranslate".to_string()
}

fn default_group() -> String {
    "translate".to_string()
}

fn default_poll_timeout() -> u64 {
    2
}

fn default_poll_interval() -> u64 {
    100
}
