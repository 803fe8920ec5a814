//! Redis cache backend

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tracing::debug;

use super::CacheConfig;
use crate::domain::cache::{BackendInfo, Cache};
use crate::domain::DomainError;

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis cache backed by a multiplexed `ConnectionManager`
///
/// Every command is bounded by the configured response timeout. Pattern
/// operations walk the keyspace with SCAN, never KEYS.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    endpoint: String,
    response_timeout: Duration,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("endpoint", &self.endpoint)
            .field("response_timeout", &self.response_timeout)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Connects and verifies the server answers PING within the connect timeout
    pub async fn connect(config: &CacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.connection_info())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connect_timeout = config.connect_timeout();
        let connection = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                DomainError::cache(format!(
                    "Timed out connecting to Redis at {} after {:?}",
                    config.endpoint(),
                    connect_timeout
                ))
            })?
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        let cache = Self {
            connection,
            endpoint: config.endpoint(),
            response_timeout: config.response_timeout(),
        };
        cache.ping().await?;

        debug!(endpoint = %cache.endpoint, "Connected to Redis");
        Ok(cache)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn run<T, F>(&self, command: &str, future: F) -> Result<T, DomainError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.response_timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DomainError::cache(format!(
                "Redis {} failed: {}",
                command, e
            ))),
            Err(_) => Err(DomainError::cache(format!(
                "Redis {} timed out after {:?}",
                command, self.response_timeout
            ))),
        }
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = self
                .run(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            keys.extend(batch);
            cursor = next;

            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        let _: String = self
            .run("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();
        self.run("GET", conn.get(key)).await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1);

        self.run("SETEX", conn.set_ex::<_, _, ()>(key, value, ttl_secs))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        let deleted: i64 = self.run("DEL", conn.del(key)).await?;
        Ok(deleted > 0)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        self.scan(pattern).await
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let keys = self.scan(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection.clone();
        let deleted: i64 = self.run("DEL", conn.del(&keys)).await?;
        Ok(deleted.max(0) as usize)
    }

    async fn info(&self) -> Result<BackendInfo, DomainError> {
        let mut conn = self.connection.clone();
        let text: String = self
            .run("INFO", redis::cmd("INFO").query_async(&mut conn))
            .await?;
        Ok(parse_info(&text))
    }

    async fn close(&self) -> Result<(), DomainError> {
        // The manager closes its socket once the last clone is dropped
        debug!(endpoint = %self.endpoint, "Releasing Redis connection");
        Ok(())
    }
}

/// Extracts memory usage and keyspace counters from an INFO reply
pub(crate) fn parse_info(text: &str) -> BackendInfo {
    let mut info = BackendInfo {
        used_memory: "N/A".to_string(),
        ..Default::default()
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        match name {
            "used_memory_human" => info.used_memory = value.to_string(),
            "keyspace_hits" => info.keyspace_hits = value.parse().unwrap_or(0),
            "keyspace_misses" => info.keyspace_misses = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    info
}
