//! Service description and health endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::{HealthResponse, HealthStatus, Json};

/// GET /
pub async fn home() -> impl IntoResponse {
    Json(json!({
        "message": "Movie AI Agent API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "query": "POST /api/query",
            "search": "GET /api/movies/search?title=",
            "director": "GET /api/movies/director?name=",
            "top_rated": "GET /api/movies/top?limit=",
            "genre": "GET /api/movies/genre?genre=",
            "year_range": "GET /api/movies/year-range?start=&end=",
            "actor": "GET /api/movies/actor?name=",
            "statistics": "GET /api/movies/statistics",
            "health": "GET /api/health",
            "cache_stats": "GET /api/cache/stats",
            "cache_clear": "DELETE /api/cache/clear?pattern="
        }
    }))
}

/// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /api/health
///
/// Unhealthy (503) only when the movie collection cannot be read; a missing
/// agent or cache degrades the report but keeps the status healthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let (agent, model) = match &state.agent {
        Some(agent) => ("ready".to_string(), Some(agent.model().to_string())),
        None => ("unavailable".to_string(), None),
    };
    let cache = state.cache.stats().await;

    let response = match state.query_service.count().await {
        Ok(count) => HealthResponse {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION"),
            database: "connected".to_string(),
            movies: Some(count),
            agent,
            model,
            cache,
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "Health check failed");
            HealthResponse {
                status: HealthStatus::Unhealthy,
                version: env!("CARGO_PKG_VERSION"),
                database: "unavailable".to_string(),
                movies: None,
                agent,
                model,
                cache,
                error: Some(e.to_string()),
            }
        }
    };

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    debug!(latency_ms = start.elapsed().as_millis() as u64, "Health check");
    (status_code, Json(response))
}
