//! Cache statistics snapshot

use serde::Serialize;

use super::BackendInfo;

/// Point-in-time view of the cache, recomputed on every request
///
/// Disabled stores serialize as `{"enabled": false}`; a store whose backend
/// failed to answer serializes as `{"enabled": true, "connected": false, "error": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CacheStats {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            enabled: true,
            connected: Some(false),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn connected(keys_count: usize, info: BackendInfo) -> Self {
        Self {
            enabled: true,
            connected: Some(true),
            keys_count: Some(keys_count),
            used_memory: Some(info.used_memory),
            hits: Some(info.keyspace_hits),
            misses: Some(info.keyspace_misses),
            hit_rate: Some(hit_rate(info.keyspace_hits, info.keyspace_misses)),
            error: None,
        }
    }
}

/// Hit rate in percent, rounded to two decimals; 0 when nothing was looked up
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = (hits + misses).max(1) as f64;
    let percent = hits as f64 / total * 100.0;

    (percent * 100.0).round() / 100.0
}
