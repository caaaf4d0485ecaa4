//! File system blob store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::config::StorageConfig;
use super::traits::{BlobError, BlobStore};

/// Blob store rooted at a local directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a partially written blob.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a blob path onto the root, rejecting anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        if path.is_empty() || path.contains('\\') {
            return Err(BlobError::InvalidPath(path.to_string()));
        }

        let relative = Path::new(path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(BlobError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn persist(&self, bytes: &[u8], path: &str) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| BlobError::InvalidPath(path.to_string()))?;

        fs::create_dir_all(parent)
            .await
            .map_err(|e| BlobError::io(path, e))?;

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BlobError::InvalidPath(path.to_string()))?;
        let temp = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        let write = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&temp, &target).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp).await;
            return Err(BlobError::io(path, e));
        }

        debug!("Persisted {} bytes at {}", bytes.len(), path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        let target = self.resolve(path)?;
        fs::read(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(path.to_string())
            } else {
                BlobError::io(path, e)
            }
        })
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::io(path, e)),
        }
    }
}
