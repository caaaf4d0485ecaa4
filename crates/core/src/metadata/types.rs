//! Metadata records and query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document as uploaded by a submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalFileMetadata {
    pub id: i64,
    /// Hex-encoded SHA-256 of the uploaded bytes.
    pub sha256: String,
    pub filename: String,
    /// Lower-cased extension, e.g. `docx`.
    pub file_type: String,
    pub file_size: u64,
    pub source_language: String,
    pub token_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner identity (isid).
    pub created_by: String,
}

/// A translation produced from an original file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedFileMetadata {
    pub id: i64,
    pub original_file_id: i64,
    /// Name of the translated blob, `translated-{src}-to-{dst}-{filename}`.
    pub filename: String,
    pub target_language: String,
    /// Always zero for now; billing is not computed.
    pub cost: f64,
    pub time_taken_ms: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Request to record a new original file.
#[derive(Debug, Clone)]
pub struct NewOriginalFile {
    pub sha256: String,
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
    pub source_language: String,
    pub token_count: u64,
    pub created_by: String,
}

/// Request to record a new translated file.
#[derive(Debug, Clone)]
pub struct NewTranslatedFile {
    pub original_file_id: i64,
    pub filename: String,
    pub target_language: String,
    pub cost: f64,
    pub time_taken_ms: u64,
    pub created_by: String,
}

/// Filter for querying original files.
///
/// `ids: Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default)]
pub struct OriginalFileFilter {
    pub created_by: Option<String>,
    pub filename: Option<String>,
    pub ids: Option<Vec<i64>>,
}

impl OriginalFileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_ids(mut self, ids: Vec<i64>) -> Self {
        self.ids = Some(ids);
        self
    }
}

/// Filter for querying translated files.
#[derive(Debug, Clone, Default)]
pub struct TranslatedFileFilter {
    pub created_by: Option<String>,
    pub filename: Option<String>,
    pub original_file_id: Option<i64>,
    pub ids: Option<Vec<i64>>,
}

impl TranslatedFileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_original_file_id(mut self, original_file_id: i64) -> Self {
        self.original_file_id = Some(original_file_id);
        self
    }

    pub fn with_ids(mut self, ids: Vec<i64>) -> Self {
        self.ids = Some(ids);
        self
    }
}
