//! Redis-backed status tracker.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::RedisTrackerConfig;
use super::traits::StatusTracker;
use super::types::{StatusRecord, TrackerError};

/// Value stored under each key; the key itself is the Redis key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredStatus {
    status: String,
    source_lang: String,
    target_lang: String,
    updated_at: DateTime<Utc>,
}

/// Status tracker stored in Redis as JSON strings.
///
/// Failure records are written with `SET .. EX`; all others without expiry.
pub struct RedisTracker {
    conn: MultiplexedConnection,
    key_prefix: String,
    scan_count: usize,
    failure_ttl_secs: u64,
}

impl RedisTracker {
    pub async fn connect(
        config: &RedisTrackerConfig,
        failure_ttl_secs: u64,
    ) -> Result<Self, TrackerError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| TrackerError::Configuration(e.to_string()))?;
        let conn = client.get_multiplexed_async_connection().await?;

        info!("Connected Redis status tracker");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            scan_count: config.scan_count.max(1),
            failure_ttl_secs,
        })
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// All Redis keys matching a glob, paging with SCAN.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, TrackerError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl StatusTracker for RedisTracker {
    fn name(&self) -> &str {
        "redis"
    }

    async fn create(&self, record: StatusRecord) -> Result<(), TrackerError> {
        let value = serde_json::to_string(&StoredStatus {
            status: record.status.clone(),
            source_lang: record.source_lang,
            target_lang: record.target_lang,
            updated_at: record.updated_at,
        })
        .map_err(|e| TrackerError::Encode(e.to_string()))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.redis_key(&record.key)).arg(value);
        if super::types::is_failure_status(&record.status) {
            cmd.arg("EX").arg(self.failure_ttl_secs.max(1));
        }

        let mut conn = self.conn.clone();
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, TrackerError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(self.redis_key(key))
            .query_async(&mut conn)
            .await?;

        let Some(value) = value else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredStatus>(&value) {
            Ok(stored) => Ok(Some(StatusRecord {
                key: key.to_string(),
                status: stored.status,
                source_lang: stored.source_lang,
                target_lang: stored.target_lang,
                updated_at: stored.updated_at,
            })),
            Err(e) => {
                debug!("Ignoring unreadable status under {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), TrackerError> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(self.redis_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn list(&self, pattern: &str) -> Result<Vec<StatusRecord>, TrackerError> {
        let keys = self.scan_keys(&self.redis_key(pattern)).await?;

        let mut records = Vec::with_capacity(keys.len());
        for redis_key in keys {
            let key = redis_key
                .strip_prefix(self.key_prefix.as_str())
                .unwrap_or(&redis_key);
            match self.get(key).await {
                Ok(Some(record)) => records.push(record),
                // Expired or removed since the scan.
                Ok(None) => {}
                Err(e) => debug!("Skipping {} during list: {}", key, e),
            }
        }
        Ok(records)
    }

    async fn clear(&self) -> Result<(), TrackerError> {
        let keys = self.scan_keys(&format!("{}*", self.key_prefix)).await?;
        let mut conn = self.conn.clone();
        for chunk in keys.chunks(500) {
            let _: i64 = redis::cmd("DEL").arg(chunk).query_async(&mut conn).await?;
        }
        Ok(())
    }
}
