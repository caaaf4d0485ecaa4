//! Status tracker configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackerBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub backend: TrackerBackend,

    /// Time-to-live of failure records (seconds).
    #[serde(default = "default_failure_ttl")]
    pub failure_ttl_secs: u64,

    /// Redis settings (required when backend = "redis").
    #[serde(default)]
    pub redis: Option<RedisTrackerConfig>,
}

fn default_failure_ttl() -> u64 {
    3600
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            backend: TrackerBackend::default(),
            failure_ttl_secs: default_failure_ttl(),
            redis: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisTrackerConfig {
    pub url: String,

    /// Prepended to every Redis key. Empty keeps the bare `{isid}_{filename}` keys.
    #[serde(default)]
    pub key_prefix: String,

    /// SCAN page size hint.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
}

fn default_scan_count() -> usize {
    100
}
