use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;
use crate::queue::{QueueBackend, QueueConfig};
use crate::storage::StorageConfig;
use crate::tracker::{TrackerBackend, TrackerConfig};
use crate::translator::{TranslatorBackend, TranslatorConfig};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Keys accepted by the `api_key` method.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

/// One API key and the submitter it authenticates as.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub isid: String,
    /// Allows `/orchestrator/start` and `/orchestrator/stop`.
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::ApiKey => "api_key",
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("doctranslate.db")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub queue: SanitizedQueueConfig,
    pub tracker: SanitizedTrackerConfig,
    pub translator: SanitizedTranslatorConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    /// Number of configured keys; the keys themselves are hidden.
    pub api_keys_configured: usize,
}

/// Queue settings without the Redis URL (it may embed a password).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQueueConfig {
    pub backend: QueueBackend,
    pub capacity: usize,
    pub take_timeout_ms: u64,
    pub lease_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_group: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrackerConfig {
    pub backend: TrackerBackend,
    pub failure_ttl_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_key_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranslatorConfig {
    pub backend: TranslatorBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method.as_str().to_string(),
                api_keys_configured: config.auth.api_keys.len(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            queue: SanitizedQueueConfig {
                backend: config.queue.backend,
                capacity: config.queue.capacity,
                take_timeout_ms: config.queue.take_timeout_ms,
                lease_secs: config.queue.lease_secs,
                redis_namespace: config.queue.redis.as_ref().map(|r| r.namespace.clone()),
                redis_group: config.queue.redis.as_ref().map(|r| r.group.clone()),
            },
            tracker: SanitizedTrackerConfig {
                backend: config.tracker.backend,
                failure_ttl_secs: config.tracker.failure_ttl_secs,
                redis_key_prefix: config.tracker.redis.as_ref().map(|r| r.key_prefix.clone()),
            },
            translator: SanitizedTranslatorConfig {
                backend: config.translator.backend,
                url: config.translator.http.as_ref().map(|h| h.url.clone()),
                timeout_secs: config.translator.http.as_ref().map(|h| h.timeout_secs),
                api_key_configured: config
                    .translator
                    .http
                    .as_ref()
                    .is_some_and(|h| h.api_key.is_some()),
            },
            orchestrator: config.orchestrator.clone(),
        }
    }
}
