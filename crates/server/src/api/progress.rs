//! Per-file progress for the caller.

use axum::{extract::State, http::StatusCode, Json};
use doctranslate_core::ProgressEntry;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use super::middleware::AuthUser;
use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub isid: String,
    pub files_status: Vec<ProgressEntry>,
}

/// List the tracker records of the caller's files.
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(isid): AuthUser,
) -> Result<Json<ProgressResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.library().progress(&isid).await {
        Ok(files_status) => Ok(Json(ProgressResponse {
            isid,
            files_status,
        })),
        Err(e) => {
            error!(isid = %isid, error = %e, "Failed to list progress");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}
