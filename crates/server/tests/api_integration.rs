//! End-to-end tests of the HTTP API over in-memory collaborators.

mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::{fixtures::DOCUMENT, FormPart, TestConfig, TestFixture};
use doctranslate_core::{BlobError, TranslatorError};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_keys() {
    let fixture =
        TestFixture::with_config(TestConfig::with_api_keys(vec![("secret-key", "u1")])).await;

    let response = fixture.get_with_key("/api/v1/config", "secret-key").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["auth"]["method"], "api_key");
    assert!(!String::from_utf8_lossy(&response.bytes).contains("secret-key"));
}

#[tokio::test]
async fn test_translate_then_list_and_progress() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["accepted"], 1);
    assert_eq!(response.body["failed"], json!([]));

    let progress = fixture.get("/api/v1/progress").await;
    assert_status!(progress, StatusCode::OK);
    assert_eq!(progress.body["isid"], "anonymous");
    assert_eq!(progress.body["files_status"][0]["file"], "a.docx");
    assert_eq!(progress.body["files_status"][0]["status"], "in progress");
    assert_eq!(progress.body["files_status"][0]["source_lang"], "en");
    assert_eq!(progress.body["files_status"][0]["target_lang"], "fr");

    fixture.drain().await;

    let progress = fixture.get("/api/v1/progress").await;
    assert_eq!(progress.body["files_status"], json!([]));

    let files = fixture.get("/api/v1/files").await;
    assert_status!(files, StatusCode::OK);
    let files = files.body.as_array().unwrap().clone();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "translated-en-to-fr-a.docx");
    assert_eq!(files[0]["target_language"], "fr");
    assert_eq!(files[0]["created_by"], "anonymous");

    assert!(
        fixture
            .blobs
            .contains("anonymous/translated-en-to-fr-a.docx")
            .await
    );
}

#[tokio::test]
async fn test_translate_multiple_files() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .translate(&[("a.docx", DOCUMENT), ("b.docx", DOCUMENT)], "en", "de")
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["accepted"], 2);

    fixture.drain().await;

    let files = fixture.get("/api/v1/files").await;
    assert_eq!(files.body.as_array().unwrap().len(), 2);
    assert_eq!(fixture.translator.calls().await.len(), 2);
}

#[tokio::test]
async fn test_duplicate_submission_is_rejected() {
    let fixture = TestFixture::new().await;

    let first = fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(first, StatusCode::ACCEPTED);

    let second = fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(second, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["accepted"], 0);
    assert_eq!(second.body["failed"][0]["file"], "a.docx");

    let progress = fixture.get("/api/v1/progress").await;
    assert_eq!(progress.body["files_status"][0]["status"], "duplicate");
}

#[tokio::test]
async fn test_same_name_twice_in_one_upload() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .translate(&[("a.docx", DOCUMENT), ("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["accepted"], 1);
    assert_eq!(response.body["failed"][0]["file"], "a.docx");

    fixture.drain().await;
    assert_eq!(fixture.translator.calls().await.len(), 1);

    let files = fixture.get("/api/v1/files").await;
    assert_eq!(files.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_extension() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .translate(&[("notes.pdf", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["failed"][0]["file"], "notes.pdf");
    assert!(fixture.blobs.paths().await.is_empty());
}

#[tokio::test]
async fn test_partial_acceptance_reports_failures() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .translate(&[("a.docx", DOCUMENT), ("b.txt", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["accepted"], 1);
    assert_eq!(response.body["failed"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["failed"][0]["file"], "b.txt");
}

#[tokio::test]
async fn test_missing_languages() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_multipart(
            "/api/v1/translate",
            &[
                FormPart::Text("sourceLang", "en"),
                FormPart::File("a.docx", DOCUMENT),
            ],
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("targetLang"));
}

#[tokio::test]
async fn test_no_files() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_multipart(
            "/api/v1/translate",
            &[
                FormPart::Text("sourceLang", "en"),
                FormPart::Text("targetLang", "fr"),
            ],
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blob_failure_is_server_error() {
    let fixture = TestFixture::new().await;
    fixture
        .blobs
        .set_next_persist_error(BlobError::Backend("disk full".to_string()))
        .await;

    let response = fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);

    let progress = fixture.get("/api/v1/progress").await;
    assert_eq!(progress.body["files_status"][0]["status"], "persist");
}

#[tokio::test]
async fn test_translator_failure_reported_in_progress() {
    let fixture = TestFixture::new().await;
    fixture
        .translator
        .set_next_error(TranslatorError::Timeout)
        .await;

    fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    fixture.drain().await;

    let progress = fixture.get("/api/v1/progress").await;
    assert_eq!(progress.body["files_status"][0]["file"], "a.docx");
    assert_eq!(progress.body["files_status"][0]["status"], "translate");

    let files = fixture.get("/api/v1/files").await;
    assert_eq!(files.body, json!([]));
}

#[tokio::test]
async fn test_download_bundle() {
    let fixture = TestFixture::new().await;
    fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    fixture.drain().await;

    let files = fixture.get("/api/v1/files").await;
    let id = files.body[0]["id"].as_i64().unwrap();

    let response = fixture
        .post("/api/v1/files/download", json!({ "file_ids": [id] }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/zip");
    assert!(response.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
    assert!(response.bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_download_unknown_ids() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/files/download", json!({ "file_ids": [42] }))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_files() {
    let fixture = TestFixture::new().await;
    fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    fixture.drain().await;

    let files = fixture.get("/api/v1/files").await;
    let id = files.body[0]["id"].as_i64().unwrap();

    let response = fixture
        .delete_with_body("/api/v1/files", json!({ "file_ids": [id] }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["translated_deleted"], 1);
    assert_eq!(response.body["originals_deleted"], 1);

    let files = fixture.get("/api/v1/files").await;
    assert_eq!(files.body, json!([]));
    assert!(fixture.blobs.paths().await.is_empty());

    // The same name can be submitted again once removed.
    let again = fixture
        .translate(&[("a.docx", DOCUMENT)], "en", "fr")
        .await;
    assert_status!(again, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_files_are_scoped_to_submitter() {
    let fixture = TestFixture::with_config(TestConfig::with_api_keys(vec![
        ("key-one", "u1"),
        ("key-two", "u2"),
    ]))
    .await;

    let response = fixture
        .post_multipart_with_key(
            "/api/v1/translate",
            &[
                FormPart::Text("sourceLang", "en"),
                FormPart::Text("targetLang", "fr"),
                FormPart::File("a.docx", DOCUMENT),
            ],
            Some("key-one"),
        )
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    fixture.drain().await;

    let mine = fixture.get_with_key("/api/v1/files", "key-one").await;
    assert_eq!(mine.body.as_array().unwrap().len(), 1);
    assert_eq!(mine.body[0]["created_by"], "u1");

    let theirs = fixture.get_with_key("/api/v1/files", "key-two").await;
    assert_eq!(theirs.body, json!([]));

    let translated = fixture.blobs.contains("u1/translated-en-to-fr-a.docx").await;
    assert!(translated);
    let output = fixture
        .translator
        .calls()
        .await
        .into_iter()
        .map(|c| c.target_lang)
        .collect::<Vec<_>>();
    assert_eq!(output, vec!["fr"]);
}

#[tokio::test]
async fn test_protected_routes_require_key() {
    let fixture = TestFixture::with_config(TestConfig::with_api_keys(vec![("key-one", "u1")])).await;

    let response = fixture.get("/api/v1/files").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = fixture.get("/api/v1/progress").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Health stays public.
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_orchestrator_control() {
    let fixture = TestFixture::new().await;

    let status = fixture.get("/api/v1/orchestrator/status").await;
    assert_status!(status, StatusCode::OK);
    assert_eq!(status.body["running"], false);
    assert_eq!(status.body["translator"], "mock");

    let started = fixture.post_empty("/api/v1/orchestrator/start").await;
    assert_status!(started, StatusCode::OK);
    assert!(fixture.orchestrator.is_running());

    let stopped = fixture.post_empty("/api/v1/orchestrator/stop").await;
    assert_status!(stopped, StatusCode::OK);
    assert!(!fixture.orchestrator.is_running());
}

#[tokio::test]
async fn test_orchestrator_control_requires_admin_key() {
    let fixture = TestFixture::with_config(
        TestConfig::with_api_keys(vec![("ops-key", "ops"), ("user-key", "u1")])
            .with_admin_key("ops-key"),
    )
    .await;

    let status = fixture
        .get_with_key("/api/v1/orchestrator/status", "user-key")
        .await;
    assert_status!(status, StatusCode::OK);

    let refused = fixture
        .post_empty_with_key("/api/v1/orchestrator/start", "user-key")
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert!(!fixture.orchestrator.is_running());

    let started = fixture
        .post_empty_with_key("/api/v1/orchestrator/start", "ops-key")
        .await;
    assert_status!(started, StatusCode::OK);
    assert!(fixture.orchestrator.is_running());

    let refused = fixture
        .post_empty_with_key("/api/v1/orchestrator/stop", "user-key")
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert!(fixture.orchestrator.is_running());

    let stopped = fixture
        .post_empty_with_key("/api/v1/orchestrator/stop", "ops-key")
        .await;
    assert_status!(stopped, StatusCode::OK);
    assert!(!fixture.orchestrator.is_running());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    let text = String::from_utf8(response.bytes).unwrap();
    assert!(text.contains("doctranslate_http_requests_total"));
    assert!(text.contains("doctranslate_orchestrator_running"));
}
