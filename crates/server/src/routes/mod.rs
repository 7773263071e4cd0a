//! API route handlers
//!
//! - `search`: ranked company search
//! - `stats`: catalog size
//! - `health`: liveness, readiness and metrics

pub mod health;
pub mod search;
pub mod stats;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service banner (GET /).
///
/// ```json
/// {"status": "ok", "message": "Business Search API", "version": "0.1.0", "timestamp": "..."}
/// ```
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Business Search API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}
