use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Liveness: 200 while the process serves requests.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "bizsearch-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness: 200 when the catalog answers a count, 503 otherwise.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let backend = state.config.search.catalog.backend.as_str();
    match state.catalog.count().await {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "service": "bizsearch-server",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "uptime_seconds": uptime_seconds(),
                "components": {
                    "api": "ready",
                    "catalog": { "status": "ready", "backend": backend, "records": records },
                }
            })),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": "bizsearch-server",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "error": err.to_string(),
                    "components": {
                        "api": "ready",
                        "catalog": { "status": "unavailable", "backend": backend },
                    }
                })),
            )
        }
    }
}

/// Prometheus exposition
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
