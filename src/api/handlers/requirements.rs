use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::EligibilityRequirements;
use crate::AppState;

pub async fn get_requirements(State(state): State<AppState>) -> Json<EligibilityRequirements> {
    Json(state.reports.requirements().snapshot().await)
}

/// Replace the whole requirement set. Reports already in flight keep the
/// snapshot they started with. Body errors answer in the same JSON error
/// shape as every other failure.
pub async fn update_requirements(
    State(state): State<AppState>,
    body: Result<Json<EligibilityRequirements>, JsonRejection>,
) -> Result<Json<EligibilityRequirements>, AppError> {
    let Json(body) = body?;
    let updated = state.reports.requirements().replace(body).await?;
    Ok(Json(updated))
}
