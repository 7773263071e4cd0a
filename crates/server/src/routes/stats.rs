use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_companies: usize,
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /api/stats
pub async fn catalog_stats(State(state): State<Arc<ServerState>>) -> ServerResult<Json<StatsResponse>> {
    let total_companies = state.catalog.count().await.map_err(ServerError::Stats)?;
    Ok(Json(StatsResponse {
        total_companies,
        database: "connected",
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
