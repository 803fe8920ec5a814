//! Cache command - statistics and clearing without starting the server

use crate::config::AppConfig;
use crate::infrastructure::cache::CacheStore;

pub async fn stats(config: AppConfig) -> anyhow::Result<()> {
    let cache = CacheStore::connect(&config.cache).await;
    let stats = cache.stats().await;
    cache.close().await;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub async fn clear(config: AppConfig, pattern: Option<&str>) -> anyhow::Result<()> {
    let cache = CacheStore::connect(&config.cache).await;

    if !cache.is_enabled() {
        anyhow::bail!("Cache is not available at {}", config.cache.endpoint());
    }

    let pattern = pattern
        .map(str::to_string)
        .unwrap_or_else(|| cache.codec().namespace_pattern());
    let deleted = cache.clear_pattern(Some(&pattern)).await;
    cache.close().await;

    println!("Cleared {} cache entries matching '{}'", deleted, pattern);
    Ok(())
}
