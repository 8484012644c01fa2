use axum::{extract::State, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /api - public API details
pub async fn api_details(State(state): State<AppState>) -> Response {
    Json(json!({
        "cdnUrl": state.config.api.cdn_url,
        "docs": state.config.api.docs_url,
    }))
    .into_response()
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.health_check().await {
        Ok(()) => ApiResponse::success(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found() -> Response {
    ApiError::not_found("Not found").into_response()
}
