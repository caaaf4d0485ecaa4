//! Relational metadata for original and translated files.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteMetadataStore;
pub use store::{MetadataError, MetadataStore};
pub use types::{
    NewOriginalFile, NewTranslatedFile, OriginalFileFilter, OriginalFileMetadata,
    TranslatedFileFilter, TranslatedFileMetadata,
};
