use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in file library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// None of the requested files exist for this submitter.
    #[error("no matching files")]
    NotFound,

    #[error("metadata error: {0}")]
    Metadata(#[from] crate::metadata::MetadataError),

    #[error("blob store error: {0}")]
    Blob(#[from] crate::storage::BlobError),

    #[error("tracker error: {0}")]
    Tracker(#[from] crate::tracker::TrackerError),

    #[error("failed to build archive: {0}")]
    Archive(String),
}

/// Zip archive of translated files.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Suggested download name.
    pub filename: String,
    /// Number of files in the archive.
    pub files: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    pub translated_deleted: usize,
    pub originals_deleted: usize,
}

/// One file's status as shown to its submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Filename without the `{isid}_` prefix.
    pub file: String,
    /// Status with any `fail:` prefix removed.
    pub status: String,
    pub source_lang: String,
    pub target_lang: String,
    pub updated_at: DateTime<Utc>,
}
