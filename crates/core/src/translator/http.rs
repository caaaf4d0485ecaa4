//! Remote translation service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use tracing::debug;

use super::config::HttpTranslatorConfig;
use super::traits::{Translator, TranslatorError};

/// Translator backed by an HTTP service.
///
/// Sends a multipart form with `file`, `source_lang` and `target_lang` parts
/// and expects the translated document as the raw response body.
pub struct HttpTranslator {
    client: Client,
    config: HttpTranslatorConfig,
}

impl HttpTranslator {
    pub fn new(config: HttpTranslatorConfig) -> Result<Self, TranslatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslatorError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate(
        &self,
        content: &[u8],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<u8>, TranslatorError> {
        let file_part = multipart::Part::bytes(content.to_vec())
            .file_name("document")
            .mime_str("application/octet-stream")
            .map_err(|e| TranslatorError::Request(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("source_lang", source_lang.to_string())
            .text("target_lang", target_lang.to_string());

        let mut request = self.client.post(&self.config.url).multipart(form);
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TranslatorError::Timeout
            } else {
                TranslatorError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TranslatorError::Request(e.to_string()))?;

        debug!(
            "Translated {} bytes into {} bytes ({} -> {})",
            content.len(),
            bytes.len(),
            source_lang,
            target_lang
        );

        Ok(bytes.to_vec())
    }
}
