//! Types for the translate orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// File extension not in the accepted list.
    #[error("invalid file extension for {filename}, allowed: {allowed}")]
    InvalidExtension { filename: String, allowed: String },

    /// Filename unusable as a blob path component.
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// The submitter already uploaded a file with this name.
    #[error("duplicate file: {filename}")]
    Duplicate { filename: String },

    #[error("tracker error: {0}")]
    Tracker(#[from] crate::tracker::TrackerError),

    #[error("blob store error: {0}")]
    Blob(#[from] crate::storage::BlobError),

    #[error("metadata error: {0}")]
    Metadata(#[from] crate::metadata::MetadataError),

    #[error("queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    #[error("translator error: {0}")]
    Translator(#[from] crate::translator::TranslatorError),
}

impl OrchestratorError {
    /// Whether the error was caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrchestratorError::InvalidExtension { .. }
                | OrchestratorError::InvalidFilename(_)
                | OrchestratorError::Duplicate { .. }
        )
    }
}

/// One file submitted for translation.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub content: Vec<u8>,
    pub filename: String,
    pub size: u64,
    /// Submitter identity.
    pub isid: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// A file of a multi-file submission that was not accepted.
#[derive(Debug)]
pub struct SubmitFailure {
    pub filename: String,
    pub error: OrchestratorError,
}

/// Result of one worker tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was waiting.
    Idle,
    /// The task was translated and acknowledged.
    Completed {
        key: String,
        translated_file_id: i64,
    },
    /// The task ended in a failure status.
    Failed {
        key: String,
        status: String,
        acknowledged: bool,
    },
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the worker loop is running.
    pub running: bool,
    /// Ticks run since startup.
    pub ticks: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// Tasks waiting in the queue, if the backend could report it.
    pub queue_depth: Option<usize>,
    pub queue_backend: String,
    pub tracker_backend: String,
    pub translator: String,
}
