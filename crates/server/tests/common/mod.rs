//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router over in-memory collaborators. The
//! worker loop is not started; tests drive it one step at a time with
//! `fixture.orchestrator.tick()`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use doctranslate_core::testing::{MockBlobStore, MockTranslator};
use doctranslate_core::{
    create_authenticator, ApiKeyEntry, AuthConfig, AuthMethod, ChannelQueue, Config,
    DatabaseConfig, FileLibrary, InMemoryTracker, OrchestratorConfig, SqliteMetadataStore,
    TranslateOrchestrator,
};
use doctranslate_server::state::AppState;

pub use doctranslate_core::testing::fixtures;

const BOUNDARY: &str = "doctranslate-test-boundary";

/// Test fixture with a router over in-memory collaborators.
pub struct TestFixture {
    pub router: Router,
    pub orchestrator: Arc<TranslateOrchestrator>,
    pub blobs: Arc<MockBlobStore>,
    pub translator: Arc<MockTranslator>,
    pub tracker: Arc<InMemoryTracker>,
    /// Holds the test database.
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub bytes: Vec<u8>,
}

/// One part of a multipart form.
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

impl TestFixture {
    /// Fixture with anonymous access.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let auth = if test_config.api_keys.is_empty() {
            AuthConfig {
                method: AuthMethod::None,
                api_keys: vec![],
            }
        } else {
            AuthConfig {
                method: AuthMethod::ApiKey,
                api_keys: test_config
                    .api_keys
                    .iter()
                    .map(|(key, isid)| ApiKeyEntry {
                        key: key.to_string(),
                        isid: isid.to_string(),
                        admin: test_config.admin_keys.contains(key),
                    })
                    .collect(),
            }
        };

        let config = Config {
            auth,
            server: Default::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            storage: Default::default(),
            queue: Default::default(),
            tracker: Default::default(),
            translator: Default::default(),
            orchestrator: OrchestratorConfig {
                enabled: false,
                ..Default::default()
            },
        };

        let queue = Arc::new(ChannelQueue::new(
            64,
            Duration::from_millis(20),
            Duration::from_secs(30),
        ));
        let tracker = Arc::new(InMemoryTracker::new(Duration::from_secs(60)));
        let blobs = Arc::new(MockBlobStore::new());
        let metadata =
            Arc::new(SqliteMetadataStore::new(&db_path).expect("Failed to create metadata store"));
        let translator = Arc::new(MockTranslator::new());

        let orchestrator = Arc::new(TranslateOrchestrator::new(
            config.orchestrator.clone(),
            queue,
            tracker.clone(),
            blobs.clone(),
            metadata.clone(),
            translator.clone(),
        ));
        let library = Arc::new(FileLibrary::new(
            blobs.clone(),
            metadata,
            tracker.clone(),
        ));
        let authenticator =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            orchestrator.clone(),
            library,
        ));
        let router = doctranslate_server::api::create_router(state);

        Self {
            router,
            orchestrator,
            blobs,
            translator,
            tracker,
            temp_dir,
        }
    }

    /// Run worker ticks until the queue is drained.
    pub async fn drain(&self) {
        for _ in 0..32 {
            let outcome = self.orchestrator.tick().await.expect("tick failed");
            if outcome == doctranslate_core::TickOutcome::Idle {
                return;
            }
        }
        panic!("queue did not drain");
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(self.builder("GET", path, None), Body::empty()).await
    }

    pub async fn get_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.send(self.builder("GET", path, Some(key)), Body::empty())
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.json_request("POST", path, body).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.send(self.builder("POST", path, None), Body::empty())
            .await
    }

    pub async fn post_empty_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.send(self.builder("POST", path, Some(key)), Body::empty())
            .await
    }

    pub async fn delete_with_body(&self, path: &str, body: Value) -> TestResponse {
        self.json_request("DELETE", path, body).await
    }

    /// POST a multipart form.
    pub async fn post_multipart(&self, path: &str, parts: &[FormPart<'_>]) -> TestResponse {
        self.post_multipart_with_key(path, parts, None).await
    }

    pub async fn post_multipart_with_key(
        &self,
        path: &str,
        parts: &[FormPart<'_>],
        key: Option<&str>,
    ) -> TestResponse {
        let builder = self.builder("POST", path, key).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        self.send(builder, Body::from(multipart_body(parts))).await
    }

    /// Submit files with the given languages.
    pub async fn translate(&self, files: &[(&str, &[u8])], src: &str, dst: &str) -> TestResponse {
        let mut parts = vec![FormPart::Text("sourceLang", src), FormPart::Text("targetLang", dst)];
        parts.extend(files.iter().map(|(name, body)| FormPart::File(*name, *body)));
        self.post_multipart("/api/v1/translate", &parts).await
    }

    async fn json_request(&self, method: &str, path: &str, body: Value) -> TestResponse {
        let builder = self
            .builder(method, path, None)
            .header(header::CONTENT_TYPE, "application/json");
        self.send(builder, Body::from(serde_json::to_vec(&body).unwrap()))
            .await
    }

    fn builder(&self, method: &str, path: &str, key: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match key {
            Some(key) => builder.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => builder,
        }
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File(filename, content) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                        filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// `(key, isid)` pairs; empty means anonymous access.
    pub api_keys: Vec<(&'static str, &'static str)>,
    /// Keys from `api_keys` that may control the worker.
    pub admin_keys: Vec<&'static str>,
}

impl TestConfig {
    pub fn with_api_keys(api_keys: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            api_keys,
            admin_keys: Vec::new(),
        }
    }

    pub fn with_admin_key(mut self, key: &'static str) -> Self {
        self.admin_keys.push(key);
        self
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
