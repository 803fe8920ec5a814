//! Cache administration endpoints

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ClearParams, ClearResponse, Json, Query};
use crate::domain::CacheStats;

/// GET /api/cache/stats
pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// DELETE /api/cache/clear?pattern=
pub async fn clear(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Json<ClearResponse> {
    let pattern = params
        .pattern
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| state.cache.codec().namespace_pattern());

    let keys_deleted = state.cache.clear_pattern(Some(&pattern)).await;

    Json(ClearResponse {
        message: format!("Cleared {} cache entries", keys_deleted),
        keys_deleted,
        pattern,
    })
}
