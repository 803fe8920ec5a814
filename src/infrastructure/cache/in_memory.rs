//! In-memory cache backend using moka

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::{BackendInfo, Cache, GlobPattern};
use crate::domain::DomainError;

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// Lifetime requested by the writer
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: &str, ttl: Duration) -> Self {
        Self {
            data: data.to_string(),
            ttl: ttl.max(Duration::from_secs(1)),
        }
    }
}

/// Expires each entry after the TTL it was last written with
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local cache for single-instance deployments and tests
///
/// Entries carry their own expiry so each one honours the TTL it was written
/// with. Hit and miss counters mimic the keyspace counters Redis reports.
///
/// Pattern deletes work on a snapshot of the matching keys and remove them one
/// by one, so unlike a Redis `DEL` a concurrent reader may see part of the
/// batch still present. Keys written after the snapshot survive.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: MokaCache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Snapshot of live entries whose key matches the pattern
    async fn matching(&self, pattern: &str) -> Vec<(String, usize)> {
        let glob = GlobPattern::new(pattern);
        self.cache.run_pending_tasks().await;

        self.cache
            .iter()
            .filter(|(key, _)| glob.matches(key))
            .map(|(key, entry)| (key.as_ref().clone(), key.len() + entry.data.len()))
            .collect()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let value = self.cache.get(key).await.map(|entry| entry.data);

        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.cache
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        Ok(self
            .matching(pattern)
            .await
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let mut deleted = 0;

        for (key, _) in self.matching(pattern).await {
            if self.cache.remove(&key).await.is_some() {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn info(&self) -> Result<BackendInfo, DomainError> {
        let bytes: usize = self
            .matching("*")
            .await
            .into_iter()
            .map(|(_, size)| size)
            .sum();

        Ok(BackendInfo {
            used_memory: human_bytes(bytes as u64),
            keyspace_hits: self.hits.load(Ordering::Relaxed),
            keyspace_misses: self.misses.load(Ordering::Relaxed),
        })
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        Ok(())
    }
}

/// Formats a byte count the way Redis renders `used_memory_human`
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];

    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2}{}", value, UNITS[unit])
}
