//! Translate orchestrator.
//!
//! Drives a submitted file through its states:
//! - **Submit**: validate, mark `in progress`, persist, record, enqueue
//! - **Worker tick**: take one task, translate, persist, record, clear status, acknowledge
//!
//! Failures end in a `fail:*` tracker status; the orchestrator never retries
//! on its own.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::{original_blob_path, translated_filename, TranslateOrchestrator};
pub use types::{
    OrchestratorError, OrchestratorStatus, SubmitFailure, SubmitRequest, TickOutcome,
};
