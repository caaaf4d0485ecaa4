//! Mock blob store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{BlobError, BlobStore};

/// In-memory blob store with per-operation fault injection.
#[derive(Debug, Clone, Default)]
pub struct MockBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    next_persist_error: Arc<RwLock<Option<BlobError>>>,
    next_get_error: Arc<RwLock<Option<BlobError>>>,
    next_delete_error: Arc<RwLock<Option<BlobError>>>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next `persist` to fail with the given error.
    pub async fn set_next_persist_error(&self, error: BlobError) {
        *self.next_persist_error.write().await = Some(error);
    }

    /// Configure the next `get` to fail with the given error.
    pub async fn set_next_get_error(&self, error: BlobError) {
        *self.next_get_error.write().await = Some(error);
    }

    pub async fn set_next_delete_error(&self, error: BlobError) {
        *self.next_delete_error.write().await = Some(error);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    /// All stored paths, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.blobs.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn persist(&self, bytes: &[u8], path: &str) -> Result<(), BlobError> {
        if let Some(error) = self.next_persist_error.write().await.take() {
            return Err(error);
        }
        self.blobs
            .write()
            .await
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        if let Some(error) = self.next_get_error.write().await.take() {
            return Err(error);
        }
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        if let Some(error) = self.next_delete_error.write().await.take() {
            return Err(error);
        }
        self.blobs.write().await.remove(path);
        Ok(())
    }
}
