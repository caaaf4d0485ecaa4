//! Mock translator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::translator::{Translator, TranslatorError};

/// A recorded translator call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTranslation {
    pub content: Vec<u8>,
    pub source_lang: String,
    pub target_lang: String,
}

/// Mock implementation of the Translator trait.
///
/// Output is the input prefixed with `"{target_lang}:"`, so tests can tell
/// originals and translations apart.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    calls: Arc<RwLock<Vec<RecordedTranslation>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<TranslatorError>>>,
    /// Simulated translation time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Output the mock produces for the given input.
    pub fn expected_output(content: &[u8], target_lang: &str) -> Vec<u8> {
        let mut out = format!("{}:", target_lang).into_bytes();
        out.extend_from_slice(content);
        out
    }

    pub async fn calls(&self) -> Vec<RecordedTranslation> {
        self.calls.read().await.clone()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: TranslatorError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        content: &[u8],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<u8>, TranslatorError> {
        self.calls.write().await.push(RecordedTranslation {
            content: content.to_vec(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(Self::expected_output(content, target_lang))
    }
}
