use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::Json;
use matcher::SearchResponse;
use std::sync::Arc;

/// The search text: the last `q` in the query string, empty when absent.
pub fn search_text(params: Vec<(String, String)>) -> String {
    params
        .into_iter()
        .rev()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value)
        .unwrap_or_default()
}

/// GET /api/search?q=...
pub async fn search_companies(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ServerResult<Json<SearchResponse>> {
    let query = search_text(params);
    let deadline = state.config.search_timeout();

    let response = tokio::time::timeout(
        deadline,
        state.matcher.search_response(&query, state.catalog.as_ref()),
    )
    .await
    .map_err(|_| ServerError::Timeout(state.config.search_timeout_ms))??;

    tracing::debug!(
        query = %response.query,
        count = response.count,
        "search served"
    );
    Ok(Json(response))
}
