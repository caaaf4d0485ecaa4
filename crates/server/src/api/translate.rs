//! Document submission handler.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doctranslate_core::SubmitRequest;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::middleware::AuthUser;
use super::ErrorResponse;
use crate::state::AppState;

/// A file that was not accepted.
#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Files queued for translation.
    pub accepted: usize,
    pub failed: Vec<FailedFile>,
}

struct UploadedFile {
    filename: String,
    content: Vec<u8>,
}

fn bad_request(error: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error))).into_response()
}

/// Submit one or more documents for translation.
///
/// Multipart form with repeated `file` parts plus `sourceLang` and
/// `targetLang`. Responds 202 when every file was queued. Otherwise the
/// failures are listed and the status is 400 if all of them were caused by
/// the request, 500 if any was not.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    AuthUser(isid): AuthUser,
    mut multipart: Multipart,
) -> Response {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut source_lang: Option<String> = None;
    let mut target_lang: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Invalid multipart body: {}", e)),
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => files.push(UploadedFile {
                        filename,
                        content: bytes.to_vec(),
                    }),
                    Err(e) => return bad_request(format!("Failed to read file: {}", e)),
                }
            }
            "sourceLang" => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        source_lang = Some(text.trim().to_string());
                    }
                }
            }
            "targetLang" => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        target_lang = Some(text.trim().to_string());
                    }
                }
            }
            _ => {}
        }
    }

    let (source_lang, target_lang) = match (source_lang, target_lang) {
        (Some(s), Some(t)) => (s, t),
        _ => return bad_request("sourceLang and targetLang are required"),
    };

    if files.is_empty() {
        return bad_request("No files provided");
    }

    let total = files.len();
    let requests = files
        .into_iter()
        .map(|file| SubmitRequest {
            size: file.content.len() as u64,
            content: file.content,
            filename: file.filename,
            isid: isid.clone(),
            source_lang: source_lang.clone(),
            target_lang: target_lang.clone(),
        })
        .collect();

    let failures = state.orchestrator().submit_many(requests).await;

    let status = if failures.is_empty() {
        StatusCode::ACCEPTED
    } else if failures.iter().all(|f| f.error.is_client_error()) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    for failure in failures.iter().filter(|f| !f.error.is_client_error()) {
        warn!(isid = %isid, file = %failure.filename, error = %failure.error, "Submission failed");
    }

    info!(
        isid = %isid,
        files = total,
        failed = failures.len(),
        "Translation request handled"
    );

    let response = TranslateResponse {
        accepted: total - failures.len(),
        failed: failures
            .into_iter()
            .map(|f| FailedFile {
                file: f.filename,
                error: f.error.to_string(),
            })
            .collect(),
    };

    (status, Json(response)).into_response()
}
