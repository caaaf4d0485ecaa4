//! Translation backends.
//!
//! A translator turns document bytes in one language into document bytes in
//! another with a single opaque call.

mod config;
mod echo;
mod http;
mod traits;

use std::sync::Arc;

pub use config::{HttpTranslatorConfig, TranslatorBackend, TranslatorConfig};
pub use echo::EchoTranslator;
pub use http::HttpTranslator;
pub use traits::{Translator, TranslatorError};

/// Build the configured translator backend.
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>, TranslatorError> {
    match config.backend {
        TranslatorBackend::Echo => Ok(Arc::new(EchoTranslator::new())),
        TranslatorBackend::Http => {
            let http = config.http.as_ref().ok_or_else(|| {
                TranslatorError::Configuration(
                    "translator.http must be set when using the http backend".to_string(),
                )
            })?;
            Ok(Arc::new(HttpTranslator::new(http.clone())?))
        }
    }
}
