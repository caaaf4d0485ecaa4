//! Orchestrator API handlers.

use axum::{extract::State, Json};
use doctranslate_core::OrchestratorStatus;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Get orchestrator status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status().await)
}

/// Start the worker loop
pub async fn start(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let orchestrator = state.orchestrator();
    if orchestrator.is_running() {
        return Json(MessageResponse {
            message: "Orchestrator already running".to_string(),
        });
    }

    orchestrator.start().await;
    info!("Orchestrator started via API");
    Json(MessageResponse {
        message: "Orchestrator started".to_string(),
    })
}

/// Stop the worker loop, waiting for the in-flight tick
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().stop().await;
    info!("Orchestrator stopped via API");
    Json(MessageResponse {
        message: "Orchestrator stopped".to_string(),
    })
}
