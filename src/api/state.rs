//! Shared state handed to every handler

use std::sync::Arc;

use crate::infrastructure::agent::ReactAgent;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::services::MovieQueryService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub query_service: Arc<MovieQueryService>,
    /// `None` when no LLM was reachable at startup
    pub agent: Option<Arc<ReactAgent>>,
    pub cache: Arc<CacheStore>,
}

impl AppState {
    pub fn new(
        query_service: Arc<MovieQueryService>,
        agent: Option<Arc<ReactAgent>>,
        cache: Arc<CacheStore>,
    ) -> Self {
        Self {
            query_service,
            agent,
            cache,
        }
    }
}
