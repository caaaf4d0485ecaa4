//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the translate orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Run the worker loop at startup.
    /// When disabled, submissions are still accepted and queue up.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Delay between worker ticks (milliseconds). One task per tick.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Upper bound on a single tick (seconds).
    #[serde(default = "default_tick_timeout")]
    pub tick_timeout_secs: u64,

    /// File extensions accepted for translation, without the dot.
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Deliveries of an unreadable original before the task is dropped.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,

    /// How long `stop` waits for the in-flight tick (seconds).
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,

    /// Remove already-written blobs and rows when a later submit step fails.
    #[serde(default = "default_compensate")]
    pub compensate_on_failure: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    500
}

fn default_tick_timeout() -> u64 {
    600 // 10 minutes
}

fn default_accepted_extensions() -> Vec<String> {
    vec!["docx".to_string()]
}

fn default_max_delivery_attempts() -> u32 {
    5
}

fn default_stop_timeout() -> u64 {
    5
}

fn default_compensate() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tick_interval_ms: default_tick_interval(),
            tick_timeout_secs: default_tick_timeout(),
            accepted_extensions: default_accepted_extensions(),
            max_delivery_attempts: default_max_delivery_attempts(),
            stop_timeout_secs: default_stop_timeout(),
            compensate_on_failure: default_compensate(),
        }
    }
}

impl OrchestratorConfig {
    /// Whether `filename` carries one of the accepted extensions (case-insensitive).
    pub fn accepts(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .accepted_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }
}
