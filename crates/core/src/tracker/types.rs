//! Status tracker types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every terminal failure status.
pub const FAILURE_PREFIX: &str = "fail:";

/// Status vocabulary written by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    InProgress,
    FailDuplicate,
    FailPersist,
    FailRead,
    FailTranslate,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::InProgress => "in progress",
            FileStatus::FailDuplicate => "fail:duplicate",
            FileStatus::FailPersist => "fail:persist",
            FileStatus::FailRead => "fail:read",
            FileStatus::FailTranslate => "fail:translate",
        }
    }

    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "in progress" => Some(FileStatus::InProgress),
            "fail:duplicate" => Some(FileStatus::FailDuplicate),
            "fail:persist" => Some(FileStatus::FailPersist),
            "fail:read" => Some(FileStatus::FailRead),
            "fail:translate" => Some(FileStatus::FailTranslate),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, FileStatus::InProgress)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a raw status string is a terminal failure (and therefore expires).
pub fn is_failure_status(status: &str) -> bool {
    status.starts_with(FAILURE_PREFIX)
}

/// Tracker key for a submitter's file: `"{isid}_{filename}"`.
pub fn tracker_key(isid: &str, filename: &str) -> String {
    format!("{}_{}", isid, filename)
}

/// Glob pattern matching every key of one submitter.
pub fn owner_pattern(isid: &str) -> String {
    format!("{}_*", isid)
}

/// Current status of one submitted file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub key: String,
    pub status: String,
    pub source_lang: String,
    pub target_lang: String,
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(
        key: impl Into<String>,
        status: FileStatus,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            status: status.as_str().to_string(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        is_failure_status(&self.status)
    }
}

/// Errors that can occur during tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid key pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to encode status: {0}")]
    Encode(String),

    #[error("tracker backend error: {0}")]
    Backend(String),

    #[error("tracker configuration error: {0}")]
    Configuration(String),
}

impl From<redis::RedisError> for TrackerError {
    fn from(e: redis::RedisError) -> Self {
        TrackerError::Backend(e.to_string())
    }
}
