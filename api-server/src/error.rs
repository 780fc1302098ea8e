//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

use medora_core::DiagnosticError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Caller errors (message goes back verbatim)
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    // Engine errors
    #[error("ML model not loaded")]
    ModelNotLoaded,

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ModelNotLoaded => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::PredictionFailed(msg) => {
                tracing::error!("Prediction error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<DiagnosticError> for AppError {
    fn from(err: DiagnosticError) -> Self {
        match err {
            DiagnosticError::Validation(_)
            | DiagnosticError::MissingMeasurements
            | DiagnosticError::MalformedMeasurements => {
                AppError::ValidationError(err.public_message())
            }
            DiagnosticError::EngineNotReady => AppError::ModelNotLoaded,
            DiagnosticError::PredictionFailure(detail) => AppError::PredictionFailed(detail),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::PredictionFailed(format!("prediction task aborted: {}", err))
    }
}
