//! Fail-open cache facade

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{CacheConfig, CacheFactory};
use crate::domain::cache::{Cache, CacheStats, KeyCodec};
use crate::infrastructure::observability::record_cache_lookup;

/// Shared result cache used by the query layer and the admin endpoints
///
/// Wraps an optional backend. When the backend could not be reached at
/// startup, or caching is switched off, the store is disabled and every
/// operation degrades to a no-op. Backend failures are logged and mapped to
/// "absent", `false` or `0`; nothing here returns an error.
#[derive(Debug)]
pub struct CacheStore {
    backend: RwLock<Option<Arc<dyn Cache>>>,
    codec: KeyCodec,
}

impl CacheStore {
    /// Connects to the configured backend, falling back to a disabled store
    pub async fn connect(config: &CacheConfig) -> Self {
        let codec = KeyCodec::new(config.namespace.clone());

        if !config.enabled {
            info!("Result cache disabled by configuration");
            return Self::disabled_with_codec(codec);
        }

        match CacheFactory::new().create(config).await {
            Ok(backend) => {
                info!(backend = %config.backend, namespace = %codec.namespace(), "Result cache enabled");
                Self::with_backend(backend, codec)
            }
            Err(e) => {
                warn!(
                    endpoint = %config.endpoint(),
                    error = %e,
                    "Cache unavailable, continuing without caching"
                );
                Self::disabled_with_codec(codec)
            }
        }
    }

    /// A store that never caches
    pub fn disabled() -> Self {
        Self::disabled_with_codec(KeyCodec::default())
    }

    fn disabled_with_codec(codec: KeyCodec) -> Self {
        Self {
            backend: RwLock::new(None),
            codec,
        }
    }

    /// Wraps an already connected backend
    pub fn with_backend(backend: Arc<dyn Cache>, codec: KeyCodec) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
            codec,
        }
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    pub fn is_enabled(&self) -> bool {
        self.backend().is_some()
    }

    fn backend(&self) -> Option<Arc<dyn Cache>> {
        self.backend
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Looks up a value; absent, undecodable and failed lookups all yield `None`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend()?;

        let raw = match backend.get_raw(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed");
                return None;
            }
        };

        let Some(raw) = raw else {
            record_cache_lookup(false);
            debug!(key = %key, "Cache miss");
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                record_cache_lookup(true);
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                record_cache_lookup(false);
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Stores a value with the given TTL, returning whether it was written
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache value could not be serialized");
                return false;
            }
        };

        match backend.set_raw(key, &raw, ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "Cached value");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache set failed");
                false
            }
        }
    }

    /// Removes a key; succeeds even when the key was absent
    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };

        match backend.delete(key).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    /// Removes every key matching the glob, defaulting to this namespace
    pub async fn clear_pattern(&self, pattern: Option<&str>) -> usize {
        let Some(backend) = self.backend() else {
            return 0;
        };

        let pattern = pattern
            .map(str::to_string)
            .unwrap_or_else(|| self.codec.namespace_pattern());

        match backend.delete_pattern(&pattern).await {
            Ok(deleted) => {
                info!(pattern = %pattern, deleted, "Cleared cache entries");
                deleted
            }
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Cache clear failed");
                0
            }
        }
    }

    /// Fresh statistics snapshot
    pub async fn stats(&self) -> CacheStats {
        let Some(backend) = self.backend() else {
            return CacheStats::disabled();
        };

        let keys_count = match backend.count(&self.codec.namespace_pattern()).await {
            Ok(count) => count,
            Err(e) => return CacheStats::unavailable(e.to_string()),
        };

        match backend.info().await {
            Ok(info) => CacheStats::connected(keys_count, info),
            Err(e) => CacheStats::unavailable(e.to_string()),
        }
    }

    /// Releases the backend; later calls behave like a disabled store
    pub async fn close(&self) {
        let backend = self
            .backend
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let Some(backend) = backend else {
            debug!("Cache already closed");
            return;
        };

        match backend.close().await {
            Ok(()) => info!("Cache connection closed"),
            Err(e) => warn!(error = %e, "Error while closing cache connection"),
        }
    }
}
