//! Types for the translation task queue.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A unit of deferred translation work.
///
/// Serialized as JSON on the wire for the distributed backend. Under
/// at-least-once delivery the same task may be observed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateTask {
    /// Identity of the submitter.
    pub isid: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// Source language code.
    pub source_lang: String,
    /// Target language code.
    pub target_lang: String,
    /// Id of the original-file metadata record.
    pub original_file_id: i64,
}

impl TranslateTask {
    pub fn to_json(&self) -> Result<String, QueueError> {
        serde_json::to_string(self).map_err(|e| QueueError::Encode(e.to_string()))
    }

    pub fn from_json(payload: &str) -> Result<Self, QueueError> {
        serde_json::from_str(payload).map_err(|e| QueueError::Decode(e.to_string()))
    }
}

/// A task handed out by [`TranslateQueue::take`](super::TranslateQueue::take).
///
/// The task stays leased to the consumer until `delete` is called with the
/// `ack_token`. An unacknowledged delivery is handed out again once its lease
/// runs out.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub task: TranslateTask,
    /// Opaque token used to acknowledge this delivery.
    pub ack_token: String,
    /// How many times this task has been delivered, starting at 1.
    pub attempt: u32,
}

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue is closed")]
    Closed,

    /// The queue holds as many tasks as it can buffer.
    #[error("queue is full ({0} tasks waiting)")]
    Full(usize),

    #[error("failed to encode task: {0}")]
    Encode(String),

    #[error("failed to decode task: {0}")]
    Decode(String),

    #[error("queue backend error: {0}")]
    Backend(String),

    #[error("queue configuration error: {0}")]
    Configuration(String),
}

impl From<redis::RedisError> for QueueError {
    fn from(e: redis::RedisError) -> Self {
        QueueError::Backend(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_format() {
        let task = TranslateTask {
            isid: "u1".to_string(),
            filename: "a.docx".to_string(),
            source_lang: "en".to_string(),
            target_lang: "fr".to_string(),
            original_file_id: 7,
        };

        let json: serde_json::Value = serde_json::from_str(&task.to_json().unwrap()).unwrap();
        assert_eq!(json["isid"], "u1");
        assert_eq!(json["filename"], "a.docx");
        assert_eq!(json["source_lang"], "en");
        assert_eq!(json["target_lang"], "fr");
        assert_eq!(json["original_file_id"], 7);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = TranslateTask::from_json("{not json");
        assert!(matches!(result, Err(QueueError::Decode(_))));
    }

    #[test]
    fn test_error_display() {
        let err = QueueError::Backend("connection refused".to_string());
        assert_eq!(err.to_string(), "queue backend error: connection refused");
    }
}
