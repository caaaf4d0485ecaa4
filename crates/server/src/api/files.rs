//! Translated file listing, download and removal.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use doctranslate_core::{DeleteSummary, LibraryError, TranslatedFileMetadata};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use super::middleware::AuthUser;
use super::ErrorResponse;
use crate::state::AppState;

/// Body of the download and delete requests.
#[derive(Debug, Deserialize)]
pub struct FileIdsRequest {
    /// Translated file ids.
    pub file_ids: Vec<i64>,
}

fn library_error(isid: &str, e: LibraryError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        LibraryError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No matching files")),
        ),
        e => {
            error!(isid = %isid, error = %e, "File library operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        }
    }
}

/// List the caller's translated files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(isid): AuthUser,
) -> Result<Json<Vec<TranslatedFileMetadata>>, (StatusCode, Json<ErrorResponse>)> {
    state
        .library()
        .list_translated(&isid)
        .map(Json)
        .map_err(|e| library_error(&isid, e))
}

/// Download the requested translated files as one zip archive.
pub async fn download_files(
    State(state): State<Arc<AppState>>,
    AuthUser(isid): AuthUser,
    Json(request): Json<FileIdsRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let bundle = state
        .library()
        .bundle(&isid, &request.file_ids)
        .await
        .map_err(|e| library_error(&isid, e))?;

    let disposition = format!("attachment; filename=\"{}\"", bundle.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bundle.bytes,
    )
        .into_response())
}

/// Delete the requested translated files and any originals left without one.
pub async fn delete_files(
    State(state): State<Arc<AppState>>,
    AuthUser(isid): AuthUser,
    Json(request): Json<FileIdsRequest>,
) -> Result<Json<DeleteSummary>, (StatusCode, Json<ErrorResponse>)> {
    state
        .library()
        .delete_translated(&isid, &request.file_ids)
        .await
        .map(Json)
        .map_err(|e| library_error(&isid, e))
}
