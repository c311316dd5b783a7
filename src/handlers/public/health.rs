use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match state.db.health_check().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "database": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiResponse::with_status(
                json!({
                    "status": "unhealthy",
                    "timestamp": timestamp,
                    "database": "disconnected"
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}
