//! Mock metadata store for testing.

use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::metadata::{
    MetadataError, MetadataStore, NewOriginalFile, NewTranslatedFile, OriginalFileFilter,
    OriginalFileMetadata, TranslatedFileFilter, TranslatedFileMetadata,
};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    originals: Vec<OriginalFileMetadata>,
    translated: Vec<TranslatedFileMetadata>,
    next_error: Option<MetadataError>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_error(&mut self) -> Result<(), MetadataError> {
        match self.next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// In-memory metadata store.
///
/// `set_next_error` makes the next call of any operation fail.
#[derive(Debug, Clone, Default)]
pub struct MockMetadataStore {
    state: Arc<Mutex<State>>,
}

impl MockMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_next_error(&self, error: MetadataError) {
        self.lock().next_error = Some(error);
    }

    pub fn original_count(&self) -> usize {
        self.lock().originals.len()
    }

    pub fn translated_count(&self) -> usize {
        self.lock().translated.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_ids(ids: &Option<Vec<i64>>, id: i64) -> bool {
    ids.as_ref().map_or(true, |ids| ids.contains(&id))
}

impl MetadataStore for MockMetadataStore {
    fn create_original(
        &self,
        request: NewOriginalFile,
    ) -> Result<OriginalFileMetadata, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;

        let now = Utc::now();
        let file = OriginalFileMetadata {
            id: state.allocate_id(),
            sha256: request.sha256,
            filename: request.filename,
            file_type: request.file_type,
            file_size: request.file_size,
            source_language: request.source_language,
            token_count: request.token_count,
            created_at: now,
            updated_at: now,
            created_by: request.created_by,
        };
        state.originals.push(file.clone());
        Ok(file)
    }

    fn get_original(&self, id: i64) -> Result<Option<OriginalFileMetadata>, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        Ok(state.originals.iter().find(|f| f.id == id).cloned())
    }

    fn list_originals(
        &self,
        filter: &OriginalFileFilter,
    ) -> Result<Vec<OriginalFileMetadata>, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        Ok(state
            .originals
            .iter()
            .filter(|f| filter.created_by.as_ref().map_or(true, |o| &f.created_by == o))
            .filter(|f| filter.filename.as_ref().map_or(true, |n| &f.filename == n))
            .filter(|f| matches_ids(&filter.ids, f.id))
            .cloned()
            .collect())
    }

    fn delete_originals(&self, ids: &[i64]) -> Result<usize, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        let before = state.originals.len();
        state.originals.retain(|f| !ids.contains(&f.id));
        Ok(before - state.originals.len())
    }

    fn create_translated(
        &self,
        request: NewTranslatedFile,
    ) -> Result<TranslatedFileMetadata, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;

        let now = Utc::now();
        let file = TranslatedFileMetadata {
            id: state.allocate_id(),
            original_file_id: request.original_file_id,
            filename: request.filename,
            target_language: request.target_language,
            cost: request.cost,
            time_taken_ms: request.time_taken_ms,
            created_at: now,
            updated_at: now,
            created_by: request.created_by,
        };
        state.translated.push(file.clone());
        Ok(file)
    }

    fn get_translated(&self, id: i64) -> Result<Option<TranslatedFileMetadata>, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        Ok(state.translated.iter().find(|f| f.id == id).cloned())
    }

    fn list_translated(
        &self,
        filter: &TranslatedFileFilter,
    ) -> Result<Vec<TranslatedFileMetadata>, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        Ok(state
            .translated
            .iter()
            .filter(|f| filter.created_by.as_ref().map_or(true, |o| &f.created_by == o))
            .filter(|f| filter.filename.as_ref().map_or(true, |n| &f.filename == n))
            .filter(|f| {
                filter
                    .original_file_id
                    .map_or(true, |id| f.original_file_id == id)
            })
            .filter(|f| matches_ids(&filter.ids, f.id))
            .cloned()
            .collect())
    }

    fn update_translated(
        &self,
        id: i64,
        cost: f64,
        time_taken_ms: u64,
    ) -> Result<TranslatedFileMetadata, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        let file = state
            .translated
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(MetadataError::NotFound(id))?;
        file.cost = cost;
        file.time_taken_ms = time_taken_ms;
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    fn delete_translated(&self, ids: &[i64]) -> Result<usize, MetadataError> {
        let mut state = self.lock();
        state.check_error()?;
        let before = state.translated.len();
        state.translated.retain(|f| !ids.contains(&f.id));
        Ok(before - state.translated.len())
    }
}
