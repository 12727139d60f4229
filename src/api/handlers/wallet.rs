use std::panic::AssertUnwindSafe;

use axum::extract::{Path, State};
use axum::Json;
use futures_util::FutureExt;

use crate::errors::AppError;
use crate::models::{WalletAddress, WalletReport};
use crate::AppState;

pub async fn report(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletReport>, AppError> {
    let address = WalletAddress::parse(&address)?;

    // Upstream failures are absorbed by the collector; only a bug in the
    // pipeline itself ends up here.
    let report = AssertUnwindSafe(state.reports.build_report(&address))
        .catch_unwind()
        .await
        .map_err(|_| anyhow::anyhow!("report pipeline panicked for {}", address.short()))?;

    Ok(Json(report))
}
