pub mod files;
pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod progress;
pub mod routes;
pub mod translate;

use serde::Serialize;

pub use routes::create_router;

/// Error body shared by all handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
