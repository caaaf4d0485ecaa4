//! Translate orchestrator implementation.
//!
//! Submissions run on the caller's task. A single background loop takes one
//! queued task per tick and drives it to a translated file or a failure status.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::metadata::{
    MetadataStore, NewOriginalFile, NewTranslatedFile, OriginalFileFilter, OriginalFileMetadata,
    TranslatedFileFilter,
};
use crate::metrics;
use crate::queue::{Delivery, TranslateQueue, TranslateTask};
use crate::storage::BlobStore;
use crate::tracker::{tracker_key, FileStatus, StatusRecord, StatusTracker};
use crate::translator::Translator;

use super::config::OrchestratorConfig;
use super::types::{
    OrchestratorError, OrchestratorStatus, SubmitFailure, SubmitRequest, TickOutcome,
};

/// Blob path of an uploaded original.
pub fn original_blob_path(isid: &str, filename: &str) -> String {
    format!("{}/{}", isid, filename)
}

/// Name given to the translation of `filename`.
pub fn translated_filename(source_lang: &str, target_lang: &str, filename: &str) -> String {
    format!("translated-{}-to-{}-{}", source_lang, target_lang, filename)
}

/// Collaborators and counters shared with the worker loop.
struct Inner {
    config: OrchestratorConfig,
    queue: Arc<dyn TranslateQueue>,
    tracker: Arc<dyn StatusTracker>,
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    translator: Arc<dyn Translator>,
    /// Tracker keys with a submission between its duplicate check and its metadata write.
    claims: StdMutex<HashSet<String>>,
    ticks: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
}

/// The translate orchestrator - owns submission and the worker loop.
pub struct TranslateOrchestrator {
    inner: Arc<Inner>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TranslateOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        queue: Arc<dyn TranslateQueue>,
        tracker: Arc<dyn StatusTracker>,
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            inner: Arc::new(Inner {
                config,
                queue,
                tracker,
                blobs,
                metadata,
                translator,
                claims: StdMutex::new(HashSet::new()),
                ticks: AtomicU64::new(0),
                tasks_completed: AtomicU64::new(0),
                tasks_failed: AtomicU64::new(0),
            }),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the worker loop.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        info!("Starting translate orchestrator");

        let inner = Arc::clone(&self.inner);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = Duration::from_millis(inner.config.tick_interval_ms);

        let handle = tokio::spawn(async move {
            info!("Worker loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Worker loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        if let Err(e) = inner.tick().await {
                            warn!("Worker tick error: {}", e);
                        }
                    }
                }
            }
            info!("Worker loop stopped");
        });

        *self.worker.lock().await = Some(handle);
    }

    /// Stop the worker loop, letting an in-flight tick finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping translate orchestrator");

        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.worker.lock().await.take() {
            let wait = Duration::from_secs(self.inner.config.stop_timeout_secs);
            match tokio::time::timeout(wait, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Worker loop panicked: {}", e),
                Err(_) => warn!(
                    "Worker loop did not stop within {}s, leaving it to finish",
                    wait.as_secs()
                ),
            }
        }

        info!("Translate orchestrator stopped");
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        let queue_depth = match self.inner.queue.pending().await {
            Ok(depth) => Some(depth),
            Err(e) => {
                debug!("Could not read queue depth: {}", e);
                None
            }
        };

        OrchestratorStatus {
            running: self.is_running(),
            ticks: self.inner.ticks.load(Ordering::Relaxed),
            tasks_completed: self.inner.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.inner.tasks_failed.load(Ordering::Relaxed),
            queue_depth,
            queue_backend: self.inner.queue.name().to_string(),
            tracker_backend: self.inner.tracker.name().to_string(),
            translator: self.inner.translator.name().to_string(),
        }
    }

    /// Accept one file for translation.
    ///
    /// On success the file is persisted, recorded, marked `in progress` and
    /// queued. Returns the new original file record.
    pub async fn submit(
        &self,
        request: SubmitRequest,
    ) -> Result<OriginalFileMetadata, OrchestratorError> {
        let result = self.inner.submit(request).await;
        let label = match &result {
            Ok(_) => "accepted",
            Err(OrchestratorError::Duplicate { .. }) => "duplicate",
            Err(e) if e.is_client_error() => "invalid",
            Err(_) => "error",
        };
        metrics::SUBMISSIONS_TOTAL.with_label_values(&[label]).inc();
        result
    }

    /// Submit several files concurrently. Returns only the failures.
    pub async fn submit_many(&self, requests: Vec<SubmitRequest>) -> Vec<SubmitFailure> {
        let submissions = requests.into_iter().map(|request| async move {
            let filename = request.filename.clone();
            self.submit(request)
                .await
                .err()
                .map(|error| SubmitFailure { filename, error })
        });

        futures::future::join_all(submissions)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Run one bounded worker tick.
    pub async fn tick(&self) -> Result<TickOutcome, OrchestratorError> {
        self.inner.tick().await
    }
}

impl Inner {
    async fn submit(
        &self,
        request: SubmitRequest,
    ) -> Result<OriginalFileMetadata, OrchestratorError> {
        let SubmitRequest {
            content,
            filename,
            size,
            isid,
            source_lang,
            target_lang,
        } = request;

        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename == "."
            || filename == ".."
        {
            return Err(OrchestratorError::InvalidFilename(filename));
        }

        if !self.config.accepts(&filename) {
            return Err(OrchestratorError::InvalidExtension {
                filename,
                allowed: self.config.accepted_extensions.join(", "),
            });
        }

        let key = tracker_key(&isid, &filename);

        // Claimed before the first await so concurrent submissions of one
        // file cannot both pass the metadata check.
        let Some(_claim) = SubmitClaim::acquire(&self.claims, &key) else {
            self.mark(&key, FileStatus::FailDuplicate, &source_lang, &target_lang)
                .await;
            return Err(OrchestratorError::Duplicate { filename });
        };

        self.tracker
            .create(StatusRecord::new(
                &key,
                FileStatus::InProgress,
                &source_lang,
                &target_lang,
            ))
            .await?;

        let existing = self.metadata.list_originals(
            &OriginalFileFilter::new()
                .with_created_by(&isid)
                .with_filename(&filename),
        )?;
        if !existing.is_empty() {
            self.mark(&key, FileStatus::FailDuplicate, &source_lang, &target_lang)
                .await;
            return Err(OrchestratorError::Duplicate { filename });
        }

        let blob_path = original_blob_path(&isid, &filename);
        if let Err(e) = self.blobs.persist(&content, &blob_path).await {
            self.mark(&key, FileStatus::FailPersist, &source_lang, &target_lang)
                .await;
            return Err(e.into());
        }

        let file_type = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let original = match self.metadata.create_original(NewOriginalFile {
            sha256: format!("{:x}", Sha256::digest(&content)),
            filename: filename.clone(),
            file_type,
            file_size: size,
            source_language: source_lang.clone(),
            token_count: 0,
            created_by: isid.clone(),
        }) {
            Ok(original) => original,
            Err(e) => {
                self.compensate_blob(&blob_path).await;
                return Err(e.into());
            }
        };

        let task = TranslateTask {
            isid,
            filename,
            source_lang,
            target_lang,
            original_file_id: original.id,
        };

        if let Err(e) = self.queue.add(task).await {
            if self.config.compensate_on_failure {
                if let Err(del) = self.metadata.delete_originals(&[original.id]) {
                    warn!("Failed to remove metadata for {}: {}", key, del);
                }
            }
            self.compensate_blob(&blob_path).await;
            return Err(e.into());
        }

        info!("Queued {} for translation", key);
        Ok(original)
    }

    async fn tick(&self) -> Result<TickOutcome, OrchestratorError> {
        self.ticks.fetch_add(1, Ordering::Relaxed);

        let Some(delivery) = self.queue.take().await? else {
            return Ok(TickOutcome::Idle);
        };

        let started = Instant::now();
        let outcome = self.process_bounded(delivery).await;
        metrics::TICK_DURATION.observe(started.elapsed().as_secs_f64());

        match &outcome {
            Ok(TickOutcome::Completed { .. }) => {
                self.tasks_completed.fetch_add(1, Ordering::Relaxed);
                metrics::TASKS_PROCESSED_TOTAL
                    .with_label_values(&["completed"])
                    .inc();
            }
            Ok(TickOutcome::Failed { status, .. }) => {
                self.tasks_failed.fetch_add(1, Ordering::Relaxed);
                metrics::TASKS_PROCESSED_TOTAL
                    .with_label_values(&[status.as_str()])
                    .inc();
            }
            _ => {}
        }

        outcome
    }

    /// Process a delivery within `tick_timeout_secs`.
    ///
    /// A task that runs out of time is marked `fail:translate` and acknowledged,
    /// so the translator is never called for it again.
    async fn process_bounded(
        &self,
        delivery: Delivery,
    ) -> Result<TickOutcome, OrchestratorError> {
        let timeout = Duration::from_secs(self.config.tick_timeout_secs);
        let task = delivery.task.clone();
        let ack_token = delivery.ack_token.clone();

        match tokio::time::timeout(timeout, self.process(delivery)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let key = tracker_key(&task.isid, &task.filename);
                warn!("Processing {} timed out after {}s", key, timeout.as_secs());
                self.mark_task(&key, FileStatus::FailTranslate, &task).await;
                self.queue.delete(&ack_token).await?;
                Ok(Self::failed(key, FileStatus::FailTranslate, true))
            }
        }
    }

    async fn process(&self, delivery: Delivery) -> Result<TickOutcome, OrchestratorError> {
        let Delivery {
            task,
            ack_token,
            attempt,
        } = delivery;
        let key = tracker_key(&task.isid, &task.filename);

        debug!("Processing {} (attempt {})", key, attempt);

        let original_path = original_blob_path(&task.isid, &task.filename);
        let content = match self.blobs.get(&original_path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read original for {}: {}", key, e);
                self.mark_task(&key, FileStatus::FailRead, &task).await;

                // Left for redelivery until the attempts run out.
                let acknowledged = attempt >= self.config.max_delivery_attempts;
                if acknowledged {
                    warn!("Dropping {} after {} attempts", key, attempt);
                    self.queue.delete(&ack_token).await?;
                }
                return Ok(Self::failed(key, FileStatus::FailRead, acknowledged));
            }
        };

        let started = Instant::now();
        let translated = self
            .translator
            .translate(&content, &task.source_lang, &task.target_lang)
            .await;
        let elapsed = started.elapsed();
        metrics::TRANSLATION_DURATION
            .with_label_values(&[
                self.translator.name(),
                if translated.is_ok() { "success" } else { "error" },
            ])
            .observe(elapsed.as_secs_f64());

        let translated = match translated {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Translation failed for {}: {}", key, e);
                self.mark_task(&key, FileStatus::FailTranslate, &task).await;
                self.queue.delete(&ack_token).await?;
                return Ok(Self::failed(key, FileStatus::FailTranslate, true));
            }
        };

        let translated_name =
            translated_filename(&task.source_lang, &task.target_lang, &task.filename);
        let translated_path = original_blob_path(&task.isid, &translated_name);

        if let Err(e) = self.blobs.persist(&translated, &translated_path).await {
            warn!("Failed to persist translation for {}: {}", key, e);
            self.mark_task(&key, FileStatus::FailPersist, &task).await;
            self.queue.delete(&ack_token).await?;
            return Ok(Self::failed(key, FileStatus::FailPersist, true));
        }

        let time_taken_ms = elapsed.as_millis() as u64;
        let translated_file_id =
            match self.record_translation(&task, &translated_name, time_taken_ms) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Failed to record translation for {}: {}", key, e);
                    self.mark_task(&key, FileStatus::FailPersist, &task).await;
                    self.compensate_blob(&translated_path).await;
                    self.queue.delete(&ack_token).await?;
                    return Ok(Self::failed(key, FileStatus::FailPersist, true));
                }
            };

        // Without an ack the task comes back and is recorded idempotently.
        self.tracker.delete(&key).await?;
        self.queue.delete(&ack_token).await?;

        info!(
            "Translated {} ({} -> {}) in {}ms",
            key, task.source_lang, task.target_lang, time_taken_ms
        );

        Ok(TickOutcome::Completed {
            key,
            translated_file_id,
        })
    }

    /// Create the translated record, or refresh it if a redelivery already did.
    fn record_translation(
        &self,
        task: &TranslateTask,
        translated_name: &str,
        time_taken_ms: u64,
    ) -> Result<i64, OrchestratorError> {
        let existing = self.metadata.list_translated(
            &TranslatedFileFilter::new()
                .with_original_file_id(task.original_file_id)
                .with_filename(translated_name),
        )?;

        if let Some(previous) = existing.first() {
            debug!(
                "Translated record {} already exists, refreshing",
                previous.id
            );
            let updated = self
                .metadata
                .update_translated(previous.id, 0.0, time_taken_ms)?;
            return Ok(updated.id);
        }

        let created = self.metadata.create_translated(NewTranslatedFile {
            original_file_id: task.original_file_id,
            filename: translated_name.to_string(),
            target_language: task.target_lang.clone(),
            cost: 0.0,
            time_taken_ms,
            created_by: task.isid.clone(),
        })?;
        Ok(created.id)
    }

    fn failed(key: String, status: FileStatus, acknowledged: bool) -> TickOutcome {
        TickOutcome::Failed {
            key,
            status: status.as_str().to_string(),
            acknowledged,
        }
    }

    /// Write a status, logging instead of failing.
    async fn mark(&self, key: &str, status: FileStatus, source_lang: &str, target_lang: &str) {
        let record = StatusRecord::new(key, status, source_lang, target_lang);
        if let Err(e) = self.tracker.create(record).await {
            warn!("Failed to record status {} for {}: {}", status, key, e);
        }
    }

    async fn mark_task(&self, key: &str, status: FileStatus, task: &TranslateTask) {
        self.mark(key, status, &task.source_lang, &task.target_lang)
            .await;
    }

    async fn compensate_blob(&self, path: &str) {
        if !self.config.compensate_on_failure {
            return;
        }
        if let Err(e) = self.blobs.delete(path).await {
            warn!("Failed to remove blob {}: {}", path, e);
        }
    }
}

/// Exclusive hold on a tracker key for the duration of one submission.
struct SubmitClaim<'a> {
    claims: &'a StdMutex<HashSet<String>>,
    key: String,
}

impl<'a> SubmitClaim<'a> {
    fn acquire(claims: &'a StdMutex<HashSet<String>>, key: &str) -> Option<Self> {
        let mut held = claims.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(key.to_string()) {
            return None;
        }
        Some(Self {
            claims,
            key: key.to_string(),
        })
    }
}

impl Drop for SubmitClaim<'_> {
    fn drop(&mut self) {
        let mut held = self.claims.lock().unwrap_or_else(|e| e.into_inner());
        held.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SqliteMetadataStore;
    use crate::queue::ChannelQueue;
    use crate::testing::{fixtures, MockBlobStore, MockTranslator};
    use crate::tracker::InMemoryTracker;

    struct Parts {
        orchestrator: TranslateOrchestrator,
        queue: Arc<ChannelQueue>,
        tracker: Arc<InMemoryTracker>,
        blobs: Arc<MockBlobStore>,
        metadata: Arc<SqliteMetadataStore>,
        translator: Arc<MockTranslator>,
    }

    fn build(config: OrchestratorConfig) -> Parts {
        let queue = Arc::new(ChannelQueue::new(
            16,
            Duration::from_millis(20),
            Duration::from_secs(60),
        ));
        let tracker = Arc::new(InMemoryTracker::new(Duration::from_secs(60)));
        let blobs = Arc::new(MockBlobStore::new());
        let metadata = Arc::new(SqliteMetadataStore::in_memory().unwrap());
        let translator = Arc::new(MockTranslator::new());

        let orchestrator = TranslateOrchestrator::new(
            config,
            queue.clone(),
            tracker.clone(),
            blobs.clone(),
            metadata.clone(),
            translator.clone(),
        );

        Parts {
            orchestrator,
            queue,
            tracker,
            blobs,
            metadata,
            translator,
        }
    }

    fn parts() -> Parts {
        build(OrchestratorConfig::default())
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(original_blob_path("u1", "a.docx"), "u1/a.docx");
        assert_eq!(
            translated_filename("en", "fr", "a.docx"),
            "translated-en-to-fr-a.docx"
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_extension_without_tracker_write() {
        let p = parts();

        let result = p
            .orchestrator
            .submit(fixtures::submit_request("u1", "a.pdf", "en", "fr"))
            .await;

        assert!(matches!(
            result,
            Err(OrchestratorError::InvalidExtension { .. })
        ));
        assert!(p.tracker.list("*").await.unwrap().is_empty());
        assert_eq!(p.queue.pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_path_like_filename() {
        let p = parts();

        let result = p
            .orchestrator
            .submit(fixtures::submit_request("u1", "../a.docx", "en", "fr"))
            .await;

        assert!(matches!(result, Err(OrchestratorError::InvalidFilename(_))));
        assert!(p.tracker.list("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_records_hash_and_type() {
        let p = parts();
        let mut request = fixtures::submit_request("u1", "Report.DOCX", "en", "fr");
        request.content = b"abc".to_vec();
        request.size = 3;

        let original = p.orchestrator.submit(request).await.unwrap();

        assert_eq!(original.file_type, "docx");
        assert_eq!(original.file_size, 3);
        assert_eq!(
            original.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(p.blobs.get("u1/Report.DOCX").await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_submit_persist_failure_marks_fail_persist() {
        let p = parts();
        p.blobs
            .set_next_persist_error(crate::storage::BlobError::Backend("disk full".into()))
            .await;

        let result = p
            .orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await;

        assert!(matches!(result, Err(OrchestratorError::Blob(_))));
        let record = p.tracker.get("u1_a.docx").await.unwrap().unwrap();
        assert_eq!(record.status, "fail:persist");
        assert_eq!(p.queue.pending().await.unwrap(), 0);
        assert!(p
            .metadata
            .list_originals(&OriginalFileFilter::new())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_submit_many_returns_only_failures() {
        let p = parts();

        let failures = p
            .orchestrator
            .submit_many(vec![
                fixtures::submit_request("u1", "a.docx", "en", "fr"),
                fixtures::submit_request("u1", "b.pdf", "en", "fr"),
                fixtures::submit_request("u1", "c.docx", "en", "fr"),
            ])
            .await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].filename, "b.pdf");
        assert!(failures[0].error.is_client_error());
        assert_eq!(p.queue.pending().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_translate_failure_marks_and_acks() {
        let p = parts();
        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        p.translator
            .set_next_error(crate::translator::TranslatorError::Request(
                "boom".to_string(),
            ))
            .await;

        let outcome = p.orchestrator.tick().await.unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Failed {
                key: "u1_a.docx".to_string(),
                status: "fail:translate".to_string(),
                acknowledged: true,
            }
        );
        let record = p.tracker.get("u1_a.docx").await.unwrap().unwrap();
        assert_eq!(record.status, "fail:translate");
        assert_eq!(p.queue.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_read_failure_leaves_task_unacknowledged() {
        let p = parts();
        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        p.blobs
            .set_next_get_error(crate::storage::BlobError::NotFound("u1/a.docx".into()))
            .await;

        let outcome = p.orchestrator.tick().await.unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Failed {
                acknowledged: false,
                ..
            }
        ));
        let record = p.tracker.get("u1_a.docx").await.unwrap().unwrap();
        assert_eq!(record.status, "fail:read");
        assert_eq!(p.queue.in_flight().await, 1);
    }

    #[tokio::test]
    async fn test_read_failure_acks_after_max_attempts() {
        let p = build(OrchestratorConfig {
            max_delivery_attempts: 1,
            ..Default::default()
        });
        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        p.blobs
            .set_next_get_error(crate::storage::BlobError::NotFound("u1/a.docx".into()))
            .await;

        let outcome = p.orchestrator.tick().await.unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Failed {
                acknowledged: true,
                ..
            }
        ));
        assert_eq!(p.queue.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_redelivered_task_does_not_duplicate_rows() {
        let p = parts();
        let original = p
            .orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();

        // Same task delivered twice.
        p.queue
            .add(TranslateTask {
                isid: "u1".to_string(),
                filename: "a.docx".to_string(),
                source_lang: "en".to_string(),
                target_lang: "fr".to_string(),
                original_file_id: original.id,
            })
            .await
            .unwrap();

        let first = p.orchestrator.tick().await.unwrap();
        let second = p.orchestrator.tick().await.unwrap();

        let (TickOutcome::Completed { translated_file_id: a, .. }, TickOutcome::Completed { translated_file_id: b, .. }) = (first, second) else {
            panic!("both ticks should complete");
        };
        assert_eq!(a, b);
        assert_eq!(
            p.metadata
                .list_translated(&TranslatedFileFilter::new())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_status_counts_ticks() {
        let p = parts();
        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();

        p.orchestrator.tick().await.unwrap();
        p.orchestrator.tick().await.unwrap();

        let status = p.orchestrator.status().await;
        assert!(!status.running);
        assert_eq!(status.ticks, 2);
        assert_eq!(status.tasks_completed, 1);
        assert_eq!(status.tasks_failed, 0);
        assert_eq!(status.queue_depth, Some(0));
        assert_eq!(status.queue_backend, "channel");
        assert_eq!(status.tracker_backend, "memory");
        assert_eq!(status.translator, "mock");
    }

    #[tokio::test]
    async fn test_tick_timeout_marks_fail_translate_and_acks() {
        let p = build(OrchestratorConfig {
            tick_timeout_secs: 1,
            ..Default::default()
        });
        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        p.translator.set_delay(Duration::from_secs(3)).await;

        let outcome = p.orchestrator.tick().await.unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Failed {
                key: "u1_a.docx".to_string(),
                status: "fail:translate".to_string(),
                acknowledged: true,
            }
        );
        let record = p.tracker.get("u1_a.docx").await.unwrap().unwrap();
        assert_eq!(record.status, "fail:translate");
        assert_eq!(p.queue.in_flight().await, 0);
        assert_eq!(p.queue.pending().await.unwrap(), 0);
        assert_eq!(p.orchestrator.status().await.tasks_failed, 1);
    }

    #[tokio::test]
    async fn test_timed_out_task_is_not_redelivered() {
        let queue = Arc::new(ChannelQueue::new(
            16,
            Duration::from_millis(20),
            Duration::from_millis(200),
        ));
        let tracker = Arc::new(InMemoryTracker::new(Duration::from_secs(60)));
        let translator = Arc::new(MockTranslator::new());
        let orchestrator = TranslateOrchestrator::new(
            OrchestratorConfig {
                tick_timeout_secs: 1,
                ..Default::default()
            },
            queue.clone(),
            tracker.clone(),
            Arc::new(MockBlobStore::new()),
            Arc::new(SqliteMetadataStore::in_memory().unwrap()),
            translator.clone(),
        );
        orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        translator.set_delay(Duration::from_secs(3)).await;

        orchestrator.tick().await.unwrap();
        // Well past the lease.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let next = orchestrator.tick().await.unwrap();

        assert_eq!(next, TickOutcome::Idle);
        assert_eq!(translator.calls().await.len(), 1);
        let record = tracker.get("u1_a.docx").await.unwrap().unwrap();
        assert_eq!(record.status, "fail:translate");
    }

    #[tokio::test]
    async fn test_concurrent_same_name_submissions_accept_one() {
        let p = parts();

        let failures = p
            .orchestrator
            .submit_many(vec![
                fixtures::submit_request("u1", "a.docx", "en", "fr"),
                fixtures::submit_request("u1", "a.docx", "en", "fr"),
            ])
            .await;

        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0].error,
            OrchestratorError::Duplicate { .. }
        ));
        assert_eq!(p.queue.pending().await.unwrap(), 1);
        assert_eq!(
            p.metadata
                .list_originals(&OriginalFileFilter::new())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_submit_into_full_queue_fails_and_compensates() {
        let queue = Arc::new(ChannelQueue::new(
            1,
            Duration::from_millis(20),
            Duration::from_secs(60),
        ));
        let blobs = Arc::new(MockBlobStore::new());
        let metadata = Arc::new(SqliteMetadataStore::in_memory().unwrap());
        let orchestrator = TranslateOrchestrator::new(
            OrchestratorConfig::default(),
            queue.clone(),
            Arc::new(InMemoryTracker::new(Duration::from_secs(60))),
            blobs.clone(),
            metadata.clone(),
            Arc::new(MockTranslator::new()),
        );

        orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();
        let result = orchestrator
            .submit(fixtures::submit_request("u1", "b.docx", "en", "fr"))
            .await;

        assert!(matches!(
            result,
            Err(OrchestratorError::Queue(crate::queue::QueueError::Full(1)))
        ));
        assert!(blobs.get("u1/b.docx").await.is_err());
        assert_eq!(
            metadata
                .list_originals(&OriginalFileFilter::new())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_submit_claim_released_on_drop() {
        let claims = StdMutex::new(HashSet::new());

        let first = SubmitClaim::acquire(&claims, "u1_a.docx");
        assert!(first.is_some());
        assert!(SubmitClaim::acquire(&claims, "u1_a.docx").is_none());
        assert!(SubmitClaim::acquire(&claims, "u1_b.docx").is_some());

        drop(first);
        assert!(SubmitClaim::acquire(&claims, "u1_a.docx").is_some());
    }

    #[tokio::test]
    async fn test_start_stop() {
        let p = build(OrchestratorConfig {
            tick_interval_ms: 10,
            ..Default::default()
        });

        p.orchestrator.start().await;
        assert!(p.orchestrator.is_running());

        p.orchestrator
            .submit(fixtures::submit_request("u1", "a.docx", "en", "fr"))
            .await
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while p.tracker.get("u1_a.docx").await.unwrap().is_some() {
            assert!(Instant::now() < deadline, "task was not processed");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        p.orchestrator.stop().await;
        assert!(!p.orchestrator.is_running());
        assert_eq!(p.translator.calls().await.len(), 1);
    }
}
