//! Per-submitter view of uploaded and translated files.
//!
//! Everything here is scoped to one isid: ids belonging to another submitter
//! are treated as unknown.

mod types;

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::metadata::{
    MetadataStore, OriginalFileFilter, TranslatedFileFilter, TranslatedFileMetadata,
};
use crate::orchestrator::original_blob_path;
use crate::storage::BlobStore;
use crate::tracker::{owner_pattern, StatusTracker, FAILURE_PREFIX};

pub use types::{Bundle, DeleteSummary, LibraryError, ProgressEntry};

/// Listing, download and removal of a submitter's files.
pub struct FileLibrary {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    tracker: Arc<dyn StatusTracker>,
}

impl FileLibrary {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        tracker: Arc<dyn StatusTracker>,
    ) -> Self {
        Self {
            blobs,
            metadata,
            tracker,
        }
    }

    /// Translated files owned by `isid`, oldest first.
    pub fn list_translated(&self, isid: &str) -> Result<Vec<TranslatedFileMetadata>, LibraryError> {
        Ok(self
            .metadata
            .list_translated(&TranslatedFileFilter::new().with_created_by(isid))?)
    }

    /// Zip the requested translated files of `isid`.
    ///
    /// Unknown ids and ids of other submitters are ignored; if none remain the
    /// call fails with `NotFound`.
    pub async fn bundle(&self, isid: &str, ids: &[i64]) -> Result<Bundle, LibraryError> {
        let files = self.owned_translated(isid, ids)?;
        if files.is_empty() {
            return Err(LibraryError::NotFound);
        }

        let paths: Vec<String> = files
            .iter()
            .map(|f| original_blob_path(isid, &f.filename))
            .collect();
        let blobs = self.blobs.get_many(&paths).await?;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (file, (_, bytes)) in files.iter().zip(blobs.iter()) {
            writer
                .start_file(file.filename.as_str(), options)
                .map_err(|e| LibraryError::Archive(e.to_string()))?;
            writer
                .write_all(bytes)
                .map_err(|e| LibraryError::Archive(e.to_string()))?;
        }

        let archive = writer
            .finish()
            .map_err(|e| LibraryError::Archive(e.to_string()))?
            .into_inner();

        Ok(Bundle {
            filename: format!("translated-files-{}.zip", chrono::Utc::now().format("%Y%m%d%H%M%S")),
            files: files.len(),
            bytes: archive,
        })
    }

    /// Remove translated files of `isid` along with their originals.
    ///
    /// An original is removed once none of its translations remain.
    pub async fn delete_translated(
        &self,
        isid: &str,
        ids: &[i64],
    ) -> Result<DeleteSummary, LibraryError> {
        let files = self.owned_translated(isid, ids)?;
        if files.is_empty() {
            return Ok(DeleteSummary::default());
        }

        let translated_ids: Vec<i64> = files.iter().map(|f| f.id).collect();
        let original_ids: Vec<i64> = files
            .iter()
            .map(|f| f.original_file_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let translated_paths: Vec<String> = files
            .iter()
            .map(|f| original_blob_path(isid, &f.filename))
            .collect();
        self.blobs.delete_many(&translated_paths).await?;
        let translated_deleted = self.metadata.delete_translated(&translated_ids)?;

        // Originals still referenced by another translation stay.
        let remaining: HashSet<i64> = self
            .metadata
            .list_translated(&TranslatedFileFilter::new().with_created_by(isid))?
            .into_iter()
            .map(|f| f.original_file_id)
            .collect();
        let orphaned: Vec<i64> = original_ids
            .into_iter()
            .filter(|id| !remaining.contains(id))
            .collect();

        let originals = self.metadata.list_originals(
            &OriginalFileFilter::new()
                .with_created_by(isid)
                .with_ids(orphaned),
        )?;
        let original_paths: Vec<String> = originals
            .iter()
            .map(|f| original_blob_path(isid, &f.filename))
            .collect();
        self.blobs.delete_many(&original_paths).await?;
        let original_ids: Vec<i64> = originals.iter().map(|f| f.id).collect();
        let originals_deleted = self.metadata.delete_originals(&original_ids)?;

        info!(
            "Deleted {} translated and {} original files for {}",
            translated_deleted, originals_deleted, isid
        );

        Ok(DeleteSummary {
            translated_deleted,
            originals_deleted,
        })
    }

    /// Tracker records of `isid`, presented for polling.
    pub async fn progress(&self, isid: &str) -> Result<Vec<ProgressEntry>, LibraryError> {
        let prefix = format!("{}_", isid);
        let records = self.tracker.list(&owner_pattern(isid)).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let Some(file) = record.key.strip_prefix(&prefix) else {
                    warn!("Tracker returned foreign key {}", record.key);
                    return None;
                };
                let status = record
                    .status
                    .strip_prefix(FAILURE_PREFIX)
                    .unwrap_or(&record.status)
                    .to_string();
                Some(ProgressEntry {
                    file: file.to_string(),
                    status,
                    source_lang: record.source_lang,
                    target_lang: record.target_lang,
                    updated_at: record.updated_at,
                })
            })
            .collect())
    }

    fn owned_translated(
        &self,
        isid: &str,
        ids: &[i64],
    ) -> Result<Vec<TranslatedFileMetadata>, LibraryError> {
        Ok(self.metadata.list_translated(
            &TranslatedFileFilter::new()
                .with_created_by(isid)
                .with_ids(ids.to_vec()),
        )?)
    }
}
