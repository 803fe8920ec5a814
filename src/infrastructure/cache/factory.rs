//! Cache backend selection

use std::sync::Arc;

use tracing::info;

use super::in_memory::InMemoryCache;
use super::redis::RedisCache;
use super::{CacheConfig, CacheType};
use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Factory for creating cache backends
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates and connects the configured backend
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.backend {
            CacheType::InMemory => {
                info!(capacity = config.max_capacity, "Using in-memory cache");
                Ok(Arc::new(InMemoryCache::new(config.max_capacity)))
            }
            CacheType::Redis => {
                let cache = RedisCache::connect(config).await?;
                info!(endpoint = %cache.endpoint(), "Using Redis cache");
                Ok(Arc::new(cache))
            }
        }
    }
}
