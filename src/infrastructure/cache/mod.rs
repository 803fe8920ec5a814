//! Cache infrastructure - backends, the fail-open store and memoization

mod config;
mod factory;
mod in_memory;
mod memoize;
mod redis;
mod store;

pub use config::{CacheConfig, CacheTtlConfig, CacheType};
pub use factory::CacheFactory;
pub use in_memory::InMemoryCache;
pub use memoize::{CacheContext, Memoized};
pub use self::redis::RedisCache;
pub use store::CacheStore;
