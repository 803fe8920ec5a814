//! Cache domain - key derivation, backend abstraction and statistics

mod key;
mod pattern;
mod repository;
mod stats;

pub use key::{CacheKeyParams, KeyCodec, DEFAULT_NAMESPACE};
pub use pattern::GlobPattern;
pub use repository::{BackendInfo, Cache, CacheExt};
pub use stats::{hit_rate, CacheStats};

#[cfg(test)]
pub use repository::mock::MockCache;
