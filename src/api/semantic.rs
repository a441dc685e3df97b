//! Semantic ETF search endpoint

use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use super::state::AppState;
use super::types::{ApiError, Json, SemanticSearchRequest, SemanticSearchResponse};

/// POST /semantic/search
pub async fn semantic_search(
    State(state): State<AppState>,
    Json(request): Json<SemanticSearchRequest>,
) -> Result<Json<SemanticSearchResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!(request_id = %request_id, query = %request.query, "Semantic search request");

    let result = state.semantic_search.search(&request.query).await;

    info!(
        request_id = %request_id,
        results = result.results.len(),
        search_time = result.search_time,
        "Semantic search response"
    );

    Ok(Json(result.into()))
}
