//! Asynchronous document translation pipeline.
//!
//! Files are submitted to the [`TranslateOrchestrator`], which records them,
//! queues a [`TranslateTask`] and tracks per-file progress in a
//! [`StatusTracker`]. A worker loop drains the queue through a
//! [`Translator`] and stores the results.

pub mod auth;
pub mod config;
pub mod library;
pub mod metadata;
pub mod metrics;
pub mod orchestrator;
pub mod queue;
pub mod storage;
pub mod testing;
pub mod tracker;
pub mod translator;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiKeyEntry, AuthConfig, AuthMethod, DatabaseConfig,
    Config, ConfigError, SanitizedConfig,
};
pub use library::{Bundle, DeleteSummary, FileLibrary, LibraryError, ProgressEntry};
pub use metadata::{
    MetadataError, MetadataStore, OriginalFileMetadata, SqliteMetadataStore,
    TranslatedFileMetadata,
};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, OrchestratorStatus, SubmitFailure, SubmitRequest,
    TickOutcome, TranslateOrchestrator,
};
pub use queue::{create_queue, ChannelQueue, QueueConfig, QueueError, TranslateQueue, TranslateTask};
pub use storage::{BlobError, BlobStore, FsBlobStore, StorageConfig};
pub use tracker::{create_tracker, InMemoryTracker, StatusRecord, StatusTracker, TrackerConfig};
pub use translator::{create_translator, Translator, TranslatorConfig, TranslatorError};
