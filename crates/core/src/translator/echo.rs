use async_trait::async_trait;

use super::traits::{Translator, TranslatorError};

/// Pass-through translator that returns its input unchanged.
#[derive(Debug, Default, Clone)]
pub struct EchoTranslator;

impl EchoTranslator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(
        &self,
        content: &[u8],
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<Vec<u8>, TranslatorError> {
        Ok(content.to_vec())
    }
}
