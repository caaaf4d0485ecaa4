//! Redis-backed queue.
//!
//! Layout per group (all keys under `{namespace}:{group}:`):
//! - `pending`  list of task ids, pushed left and popped right
//! - `active`   sorted set of leased task ids scored by lease deadline (ms)
//! - `tasks`    hash of task id to JSON payload
//! - `attempts` hash of task id to delivery count
//!
//! Dequeue first moves expired leases back to the head of `pending`, so an
//! unacknowledged task is the next one handed out once its lease runs out.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::MultiplexedConnection;
use redis::Script;
use tokio::time::Instant;
use tracing::{info, warn};

use super::config::RedisQueueConfig;
use super::traits::TranslateQueue;
use super::types::{Delivery, QueueError, TranslateTask};

/// `KEYS[1]` pending, `KEYS[2]` tasks; `ARGV[1]` id, `ARGV[2]` payload
const ENQUEUE: &str = r#"
    redis.call("HSET", KEYS[2], ARGV[1], ARGV[2])
    redis.call("LPUSH", KEYS[1], ARGV[1])
    return 1
"#;

/// `KEYS[1]` pending, `KEYS[2]` active, `KEYS[3]` tasks, `KEYS[4]` attempts
/// `ARGV[1]` now (ms), `ARGV[2]` lease deadline (ms)
/// Returns {id, payload, attempt} or nil.
const DEQUEUE: &str = r#"
    local expired = redis.call("ZRANGEBYSCORE", KEYS[2], "-inf", ARGV[1], "LIMIT", 0, 100)
    for i = #expired, 1, -1 do
        redis.call("ZREM", KEYS[2], expired[i])
        redis.call("RPUSH", KEYS[1], expired[i])
    end
    while true do
        local id = redis.call("RPOP", KEYS[1])
        if not id then
            return nil
        end
        local msg = redis.call("HGET", KEYS[3], id)
        if msg then
            redis.call("ZADD", KEYS[2], ARGV[2], id)
            local attempt = redis.call("HINCRBY", KEYS[4], id, 1)
            return {id, msg, attempt}
        end
    end
"#;

/// `KEYS[1]` active, `KEYS[2]` tasks, `KEYS[3]` attempts, `KEYS[4]` pending
/// `ARGV[1]` id
const ACK: &str = r#"
    redis.call("ZREM", KEYS[1], ARGV[1])
    redis.call("LREM", KEYS[4], 0, ARGV[1])
    redis.call("HDEL", KEYS[2], ARGV[1])
    redis.call("HDEL", KEYS[3], ARGV[1])
    return 1
"#;

/// At-least-once FIFO queue shared between processes through Redis.
pub struct RedisQueue {
    conn: MultiplexedConnection,
    pending_key: String,
    active_key: String,
    tasks_key: String,
    attempts_key: String,
    lease: Duration,
    poll_timeout: Duration,
    poll_interval: Duration,
    enqueue: Script,
    dequeue: Script,
    ack: Script,
}

impl RedisQueue {
    /// Connect to Redis and build a queue for the configured group.
    pub async fn connect(config: &RedisQueueConfig, lease: Duration) -> Result<Self, QueueError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| QueueError::Configuration(e.to_string()))?;
        let conn = client.get_multiplexed_async_connection().await?;

        info!(
            "Connected Redis queue (namespace: {}, group: {})",
            config.namespace, config.group
        );

        let prefix = format!("{}:{}", config.namespace, config.group);
        Ok(Self {
            conn,
            pending_key: format!("{}:pending", prefix),
            active_key: format!("{}:active", prefix),
            tasks_key: format!("{}:tasks", prefix),
            attempts_key: format!("{}:attempts", prefix),
            lease,
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            enqueue: Script::new(ENQUEUE),
            dequeue: Script::new(DEQUEUE),
            ack: Script::new(ACK),
        })
    }

    async fn try_dequeue(&self) -> Result<Option<Delivery>, QueueError> {
        let mut conn = self.conn.clone();
        let now = Utc::now().timestamp_millis();
        let deadline = now + self.lease.as_millis() as i64;

        let result: Option<(String, String, u32)> = self
            .dequeue
            .key(&self.pending_key)
            .key(&self.active_key)
            .key(&self.tasks_key)
            .key(&self.attempts_key)
            .arg(now)
            .arg(deadline)
            .invoke_async(&mut conn)
            .await?;

        let Some((id, payload, attempt)) = result else {
            return Ok(None);
        };

        match TranslateTask::from_json(&payload) {
            Ok(task) => Ok(Some(Delivery {
                task,
                ack_token: id,
                attempt,
            })),
            Err(e) => {
                warn!("Dropping undecodable task {}: {}", id, e);
                self.delete(&id).await?;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TranslateQueue for RedisQueue {
    fn name(&self) -> &str {
        "redis"
    }

    async fn add(&self, task: TranslateTask) -> Result<(), QueueError> {
        let payload = task.to_json()?;
        let id = uuid::Uuid::new_v4().to_string();
        let mut conn = self.conn.clone();

        let _: i64 = self
            .enqueue
            .key(&self.pending_key)
            .key(&self.tasks_key)
            .arg(&id)
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(&self) -> Result<Option<Delivery>, QueueError> {
        let deadline = Instant::now() + self.poll_timeout;
        loop {
            if let Some(delivery) = self.try_dequeue().await? {
                return Ok(Some(delivery));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: i64 = self
            .ack
            .key(&self.active_key)
            .key(&self.tasks_key)
            .key(&self.attempts_key)
            .key(&self.pending_key)
            .arg(ack_token)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn pending(&self) -> Result<usize, QueueError> {
        let mut conn = self.conn.clone();
        let len: usize = redis::cmd("LLEN")
            .arg(&self.pending_key)
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }
}
