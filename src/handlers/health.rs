//! Service banner and health check

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use crate::handlers::extract::Json;
use crate::database::health_check;
use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Alumni Portal API",
        "version": crate::VERSION,
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match health_check(state.db.pool()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
        }
    }
}
