use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;

use crate::game::ScoringOverflow;
use crate::providers::ProviderError;

/// Failures of the game engine.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no market data for {symbol} on {date}")]
    NoMarketData { symbol: String, date: NaiveDate },

    #[error("collaborator failure: {0}")]
    Collaborator(#[from] ProviderError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringOverflow),

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "NO_DATA", msg.clone()),
            AppError::BadGateway(msg) => {
                tracing::warn!("Upstream failure: {msg}");
                (StatusCode::BAD_GATEWAY, "COLLABORATOR_FAILURE", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROCESSING_ERROR",
                    "Internal server error".into(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<GameError> for AppError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::InvalidInput(msg) => AppError::BadRequest(msg),
            e @ GameError::NoMarketData { .. } => AppError::Unavailable(e.to_string()),
            GameError::Collaborator(e) => AppError::BadGateway(e.to_string()),
            GameError::Scoring(e) => AppError::Internal(e.into()),
            GameError::Store(e) => AppError::Internal(e),
        }
    }
}
