//! In-process status tracker.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::traits::StatusTracker;
use super::types::{StatusRecord, TrackerError};

#[derive(Debug)]
struct Entry {
    record: StatusRecord,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Status tracker held in process memory.
///
/// Failure records carry a deadline and are dropped lazily once it passes.
pub struct InMemoryTracker {
    entries: RwLock<HashMap<String, Entry>>,
    failure_ttl: Duration,
}

impl InMemoryTracker {
    pub fn new(failure_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            failure_ttl,
        }
    }

    /// Keys matching `pattern`, including entries that expired but were not yet dropped.
    async fn scan_keys(&self, pattern: &Regex) -> Vec<String> {
        self.entries
            .read()
            .await
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StatusTracker for InMemoryTracker {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, record: StatusRecord) -> Result<(), TrackerError> {
        let now = Instant::now();
        let expires_at = record.is_failure().then(|| now + self.failure_ttl);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(record.key.clone(), Entry { record, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, TrackerError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.record.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), TrackerError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, pattern: &str) -> Result<Vec<StatusRecord>, TrackerError> {
        let regex = glob_to_regex(pattern)?;

        let mut records = Vec::new();
        for key in self.scan_keys(&regex).await {
            if let Some(record) = self.get(&key).await? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    async fn clear(&self) -> Result<(), TrackerError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Translate a Redis-style glob into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex, TrackerError> {
    let mut re = String::from("^");
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '\\' => {
                if let Some(next) = chars.next() {
                    re.push_str(&regex_lite::escape(&next.to_string()));
                }
            }
            '[' => {
                re.push('[');
                let mut closed = false;
                let mut escaped = false;
                let mut first = true;
                for c in chars.by_ref() {
                    if escaped {
                        re.push('\\');
                        re.push(c);
                        escaped = false;
                        continue;
                    }
                    match c {
                        '\\' => escaped = true,
                        ']' => {
                            closed = true;
                            break;
                        }
                        '^' if first => re.push('^'),
                        '[' | '&' | '~' => {
                            re.push('\\');
                            re.push(c);
                        }
                        other => re.push(other),
                    }
                    first = false;
                }
                if !closed {
                    return Err(TrackerError::InvalidPattern(format!(
                        "unterminated character class in {:?}",
                        pattern
                    )));
                }
                re.push(']');
            }
            other => re.push_str(&regex_lite::escape(&other.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| TrackerError::InvalidPattern(e.to_string()))
}
