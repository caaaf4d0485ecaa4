//! Translator trait and errors.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while translating a document.
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("translation request failed: {0}")]
    Request(String),

    #[error("translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("translation timed out")]
    Timeout,

    #[error("translator configuration error: {0}")]
    Configuration(String),
}

/// Document translator.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Name of this backend, used in logs and metrics labels.
    fn name(&self) -> &str;

    /// Translate `content` from `source_lang` to `target_lang`.
    async fn translate(
        &self,
        content: &[u8],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<u8>, TranslatorError>;
}
