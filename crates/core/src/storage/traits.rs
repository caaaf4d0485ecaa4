//! Blob store trait and errors.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during blob operations.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("blob backend error: {0}")]
    Backend(String),
}

impl BlobError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        BlobError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Object storage addressed by relative slash-separated paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &str;

    /// Write `bytes` at `path`, replacing any existing blob.
    async fn persist(&self, bytes: &[u8], path: &str) -> Result<(), BlobError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError>;

    /// Remove the blob at `path`. Removing a missing blob succeeds.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;

    /// Fetch several blobs, in the order given. Fails on the first error.
    async fn get_many(&self, paths: &[String]) -> Result<Vec<(String, Vec<u8>)>, BlobError> {
        let fetches = paths.iter().map(|path| async move {
            self.get(path).await.map(|bytes| (path.clone(), bytes))
        });
        futures::future::join_all(fetches).await.into_iter().collect()
    }

    async fn delete_many(&self, paths: &[String]) -> Result<(), BlobError> {
        let deletes = paths.iter().map(|path| self.delete(path));
        futures::future::join_all(deletes)
            .await
            .into_iter()
            .collect()
    }
}
