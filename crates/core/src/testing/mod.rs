//! Testing utilities and mock implementations.
//!
//! This module provides in-memory mocks of the pipeline's collaborators,
//! allowing orchestrator and API tests without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use doctranslate_core::testing::{MockBlobStore, MockTranslator};
//!
//! let blobs = MockBlobStore::new();
//! let translator = MockTranslator::new();
//!
//! // Make the next translation fail
//! translator.set_next_error(TranslatorError::Timeout).await;
//! ```

mod mock_blob_store;
mod mock_metadata_store;
mod mock_queue;
mod mock_translator;

pub use mock_blob_store::MockBlobStore;
pub use mock_metadata_store::MockMetadataStore;
pub use mock_queue::MockQueue;
pub use mock_translator::{MockTranslator, RecordedTranslation};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::orchestrator::SubmitRequest;
    use crate::queue::TranslateTask;

    /// Placeholder document body used by fixtures.
    pub const DOCUMENT: &[u8] = b"PK\x03\x04 fake docx body";

    /// Create a submission with a small placeholder body.
    pub fn submit_request(
        isid: &str,
        filename: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> SubmitRequest {
        SubmitRequest {
            content: DOCUMENT.to_vec(),
            filename: filename.to_string(),
            size: DOCUMENT.len() as u64,
            isid: isid.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    pub fn translate_task(isid: &str, filename: &str, original_file_id: i64) -> TranslateTask {
        TranslateTask {
            isid: isid.to_string(),
            filename: filename.to_string(),
            source_lang: "en".to_string(),
            target_lang: "fr".to_string(),
            original_file_id,
        }
    }
}
