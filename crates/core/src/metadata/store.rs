//! Metadata storage trait.

use thiserror::Error;

use super::types::{
    NewOriginalFile, NewTranslatedFile, OriginalFileFilter, OriginalFileMetadata,
    TranslatedFileFilter, TranslatedFileMetadata,
};

/// Errors that can occur during metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("file record not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(String),
}

/// Storage for original and translated file records.
///
/// Listing methods return rows ordered by id ascending.
pub trait MetadataStore: Send + Sync {
    fn create_original(&self, request: NewOriginalFile)
        -> Result<OriginalFileMetadata, MetadataError>;

    fn get_original(&self, id: i64) -> Result<Option<OriginalFileMetadata>, MetadataError>;

    fn list_originals(
        &self,
        filter: &OriginalFileFilter,
    ) -> Result<Vec<OriginalFileMetadata>, MetadataError>;

    /// Delete original records by id. Returns the number of rows removed.
    fn delete_originals(&self, ids: &[i64]) -> Result<usize, MetadataError>;

    fn create_translated(
        &self,
        request: NewTranslatedFile,
    ) -> Result<TranslatedFileMetadata, MetadataError>;

    fn get_translated(&self, id: i64) -> Result<Option<TranslatedFileMetadata>, MetadataError>;

    fn list_translated(
        &self,
        filter: &TranslatedFileFilter,
    ) -> Result<Vec<TranslatedFileMetadata>, MetadataError>;

    /// Refresh cost and duration of an existing translated record.
    fn update_translated(
        &self,
        id: i64,
        cost: f64,
        time_taken_ms: u64,
    ) -> Result<TranslatedFileMetadata, MetadataError>;

    fn delete_translated(&self, ids: &[i64]) -> Result<usize, MetadataError>;
}
