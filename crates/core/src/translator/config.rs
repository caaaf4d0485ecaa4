//! Configuration for the translator module.

use serde::{Deserialize, Serialize};

/// Which translator implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatorBackend {
    /// Return the input unchanged.
    #[default]
    Echo,
    /// Call a remote translation service.
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub backend: TranslatorBackend,

    /// Settings for the HTTP backend.
    #[serde(default)]
    pub http: Option<HttpTranslatorConfig>,
}

/// Remote translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTranslatorConfig {
    /// Endpoint receiving the multipart translation request.
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional bearer token sent with each request.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_timeout_secs() -> u64 {
    300
}
