//! Blob storage for original and translated documents.

mod config;
mod fs_store;
mod traits;

pub use config::StorageConfig;
pub use fs_store::FsBlobStore;
pub use traits::{BlobError, BlobStore};
