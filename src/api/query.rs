//! Natural-language question endpoint

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest, QueryResponse};

/// POST /api/query
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("'question' must not be empty").with_param("question"));
    }

    let agent = state.agent.as_ref().ok_or_else(|| {
        ApiError::unavailable("Agent not available. Make sure Ollama is running and restart the server.")
    })?;

    info!(question = %question, "Answering question");
    let answer = agent.query(question).await;

    Ok(Json(QueryResponse {
        question: question.to_string(),
        answer,
    }))
}
