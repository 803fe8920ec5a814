//! Memoization of query operations through the shared cache

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};

use super::CacheStore;
use crate::domain::cache::CacheKeyParams;

/// Anything that may carry a result cache
pub trait CacheContext {
    fn cache(&self) -> Option<&CacheStore>;
}

/// A query operation whose results are stored under keys derived from its
/// arguments
///
/// The operation receives the context it runs in plus its arguments and is
/// only executed on a miss. A zero TTL, a missing cache or a disabled cache
/// all bypass the cache entirely.
pub struct Memoized<F> {
    operation: F,
    ttl: Duration,
    key_prefix: String,
}

impl<F> fmt::Debug for Memoized<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("key_prefix", &self.key_prefix)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<F> Memoized<F> {
    pub fn new(operation: F, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            operation,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    fn active_cache<'c, C: CacheContext>(&self, ctx: &'c C) -> Option<&'c CacheStore> {
        if self.ttl.is_zero() {
            return None;
        }
        ctx.cache().filter(|cache| cache.is_enabled())
    }

    fn key_for<A: Serialize>(&self, cache: &CacheStore, args: &A) -> String {
        cache
            .codec()
            .make_key(&CacheKeyParams::new(self.key_prefix.as_str()).with_args(args))
    }

    /// Runs an infallible operation, serving repeated calls from the cache
    pub async fn call<'a, C, A, T>(&self, ctx: &'a C, args: A) -> T
    where
        C: CacheContext,
        F: Fn(&'a C, A) -> BoxFuture<'a, T>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
    {
        let Some(cache) = self.active_cache(ctx) else {
            return (self.operation)(ctx, args).await;
        };

        let key = self.key_for(cache, &args);
        if let Some(cached) = cache.get::<T>(&key).await {
            return cached;
        }

        let result = (self.operation)(ctx, args).await;
        cache.set(&key, &result, self.ttl).await;
        result
    }

    /// Runs a fallible operation; only successful results are stored
    pub async fn try_call<'a, C, A, T, E>(&self, ctx: &'a C, args: A) -> Result<T, E>
    where
        C: CacheContext,
        F: Fn(&'a C, A) -> BoxFuture<'a, Result<T, E>>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
    {
        let Some(cache) = self.active_cache(ctx) else {
            return (self.operation)(ctx, args).await;
        };

        let key = self.key_for(cache, &args);
        if let Some(cached) = cache.get::<T>(&key).await {
            return Ok(cached);
        }

        let result = (self.operation)(ctx, args).await?;
        cache.set(&key, &result, self.ttl).await;
        Ok(result)
    }
}
