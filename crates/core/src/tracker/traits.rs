use async_trait::async_trait;

use super::types::{StatusRecord, TrackerError};

/// Keyed store of per-file status records.
///
/// Records whose status starts with `fail:` expire after the configured
/// time-to-live; all other records live until deleted.
#[async_trait]
pub trait StatusTracker: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &str;

    /// Insert or overwrite the record under `record.key`.
    async fn create(&self, record: StatusRecord) -> Result<(), TrackerError>;

    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, TrackerError>;

    async fn delete(&self, key: &str) -> Result<(), TrackerError>;

    /// All records whose key matches a glob pattern (`*`, `?`, `[...]`).
    ///
    /// Keys that disappear between the scan and the fetch are skipped.
    async fn list(&self, pattern: &str) -> Result<Vec<StatusRecord>, TrackerError>;

    /// Remove every record.
    async fn clear(&self) -> Result<(), TrackerError>;
}
