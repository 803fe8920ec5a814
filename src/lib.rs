//! Movie Agent
//!
//! Answers natural-language questions about a movie collection:
//! - ReAct agent over a local Ollama model with eight movie tools
//! - Fail-open result cache (Redis or in-process) with memoized queries
//! - REST API, interactive chat and cache administration commands

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use infrastructure::{
    agent::{movie_tools, ReactAgent},
    cache::CacheStore,
    llm::LlmProviderFactory,
    movie::InMemoryMovieRepository,
    services::MovieQueryService,
};

/// Wires the repository, cache, query service and agent together
///
/// A missing dataset is fatal. An unreachable cache disables caching and an
/// unreachable LLM leaves `agent` empty; both are logged and startup goes on.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = InMemoryMovieRepository::from_file(&config.database.dataset_path)
        .await
        .with_context(|| format!("Failed to load movies from '{}'", config.database.dataset_path))?;

    let cache = Arc::new(CacheStore::connect(&config.cache).await);

    let query_service = Arc::new(MovieQueryService::new(
        Arc::new(repository),
        Some(cache.clone()),
        &config.cache.ttl,
    ));

    let agent = match LlmProviderFactory::create(&config.llm).await {
        Ok(provider) => {
            info!(provider = provider.provider_name(), model = provider.model(), "Agent ready");
            Some(Arc::new(
                ReactAgent::new(provider, movie_tools(query_service.clone()))
                    .with_max_iterations(config.llm.max_iterations)
                    .with_temperature(config.llm.temperature),
            ))
        }
        Err(e) => {
            warn!(error = %e, "LLM unavailable, natural-language queries are disabled");
            None
        }
    };

    Ok(AppState::new(query_service, agent, cache))
}
