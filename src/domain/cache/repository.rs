//! Cache backend trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Server-side counters reported by a cache backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendInfo {
    /// Human readable memory usage (e.g. "1.05M")
    pub used_memory: String,
    /// Backend-wide successful lookups
    pub keyspace_hits: u64,
    /// Backend-wide failed lookups
    pub keyspace_misses: u64,
}

/// Key/value cache backend with TTL support
///
/// Values travel as JSON strings so the trait stays dyn-compatible; use
/// [`CacheExt`] for typed access. Implementations report every failure as an
/// error, the fail-open policy lives one layer up.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Round-trip liveness probe
    async fn ping(&self) -> Result<(), DomainError>;

    /// Gets a raw JSON value
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value that expires after `ttl`
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Lists keys matching a glob pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError>;

    /// Deletes every key matching a glob pattern as one batch
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError>;

    /// Counts keys matching a glob pattern
    async fn count(&self, pattern: &str) -> Result<usize, DomainError> {
        Ok(self.keys(pattern).await?.len())
    }

    /// Memory usage and hit/miss counters
    async fn info(&self) -> Result<BackendInfo, DomainError>;

    /// Releases the underlying connection
    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::cache::GlobPattern;

    /// Mock cache for testing
    ///
    /// Ignores TTLs and counts lookups the way a real backend would.
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, String>>,
        error: Mutex<Option<String>>,
        hits: Mutex<u64>,
        misses: Mutex<u64>,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_raw_entry(self, key: &str, raw: &str) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), raw.to_string());
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn set_error(&self, error: Option<String>) {
            *self.error.lock().unwrap() = error;
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn ping(&self) -> Result<(), DomainError> {
            self.check_error()
        }

        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.check_error()?;
            let value = self.entries.lock().unwrap().get(key).cloned();

            if value.is_some() {
                *self.hits.lock().unwrap() += 1;
            } else {
                *self.misses.lock().unwrap() += 1;
            }

            Ok(value)
        }

        async fn set_raw(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), DomainError> {
            self.check_error()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
            self.check_error()?;
            let glob = GlobPattern::new(pattern);

            Ok(self
                .entries
                .lock()
                .unwrap()
                .keys()
                .filter(|k| glob.matches(k))
                .cloned()
                .collect())
        }

        async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
            let keys = self.keys(pattern).await?;
            let mut entries = self.entries.lock().unwrap();

            Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count())
        }

        async fn info(&self) -> Result<BackendInfo, DomainError> {
            self.check_error()?;

            Ok(BackendInfo {
                used_memory: "1.00K".to_string(),
                keyspace_hits: *self.hits.lock().unwrap(),
                keyspace_misses: *self.misses.lock().unwrap(),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", "value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
        }

        #[tokio::test]
        async fn test_mock_cache_get_missing() {
            let cache = MockCache::new();

            let result: Option<String> = cache.get("missing").await.unwrap();
            assert!(result.is_none());
        }

        #[tokio::test]
        async fn test_mock_cache_typed_get_rejects_bad_json() {
            let cache = MockCache::new().with_raw_entry("bad", "{not json");

            let result: Result<Option<u32>, _> = cache.get("bad").await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_cache_with_error() {
            let cache = MockCache::new().with_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_cache_counts_hits_and_misses() {
            let cache = MockCache::new();
            cache.set("a", &1, Duration::from_secs(60)).await.unwrap();

            let _: Option<i32> = cache.get("a").await.unwrap();
            let _: Option<i32> = cache.get("b").await.unwrap();
            let _: Option<i32> = cache.get("a").await.unwrap();

            let info = cache.info().await.unwrap();
            assert_eq!(info.keyspace_hits, 2);
            assert_eq!(info.keyspace_misses, 1);
        }

        #[tokio::test]
        async fn test_mock_cache_delete_pattern() {
            let cache = MockCache::new();
            for key in ["user:1:profile", "user:2:profile", "other:key"] {
                cache.set(key, "data", Duration::from_secs(60)).await.unwrap();
            }

            let deleted = cache.delete_pattern("user:*:profile").await.unwrap();
            assert_eq!(deleted, 2);
            assert_eq!(cache.count("*").await.unwrap(), 1);
        }
    }
}
