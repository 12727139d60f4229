use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports.collector().target().block_number().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "rpc": "reachable" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the target chain");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "rpc": "unreachable" })),
            )
        }
    }
}
