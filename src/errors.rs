use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::AddressError;
use crate::services::requirements::RequirementsError;

pub const INVALID_ADDRESS_MESSAGE: &str = "Invalid Ethereum address format";

/// Failures a caller can see. Upstream RPC faults are absorbed by the
/// collector and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid requirements: {0}")]
    InvalidRequirements(#[from] RequirementsError),

    /// Request body that is not valid JSON or does not fit the expected shape.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidAddress(_)
            | AppError::InvalidRequirements(_)
            | AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body. Address errors collapse to one
    /// fixed sentence; internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidAddress(_) => INVALID_ADDRESS_MESSAGE.into(),
            AppError::InvalidRequirements(e) => e.to_string(),
            AppError::MalformedBody(rejection) => rejection.body_text(),
            AppError::Unauthorized => "Unauthorized".into(),
            AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::InvalidAddress(e) => tracing::debug!(error = %e, "Rejected wallet address"),
            AppError::MalformedBody(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body")
            }
            _ => {}
        }

        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
