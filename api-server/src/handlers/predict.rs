//! Prediction handlers
//!
//! Inference is CPU-bound, so it runs on the blocking pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use validator::Validate;

use medora_core::{BatchItem, BatchReport, MeasurementSet, PredictionResult};

use crate::{
    error::{AppError, AppResult},
    models::BatchPredictRequest,
    AppState,
};

/// POST /api/predict
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<MeasurementSet>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let engine = state.engine.engine()?.clone();

    let Json(measurements) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    if measurements.is_empty() {
        return Err(AppError::ValidationError("No data provided".to_string()));
    }

    let result = tokio::task::spawn_blocking(move || engine.predict(&measurements)).await??;

    tracing::info!(
        disease = %result.disease,
        confidence = result.confidence,
        abnormal = result.abnormal_parameters.len(),
        "Prediction served"
    );

    Ok(Json(result))
}

/// POST /api/batch-predict
pub async fn batch_predict(
    State(state): State<AppState>,
    payload: Result<Json<BatchPredictRequest>, JsonRejection>,
) -> AppResult<Json<BatchReport<Value>>> {
    let engine = state.engine.engine()?.clone();

    let Json(req) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    req.validate()
        .map_err(|_| AppError::ValidationError("No patients provided".to_string()))?;

    let items: Vec<BatchItem<Value>> = req.patients.into_iter().map(Into::into).collect();
    tracing::debug!("Batch of {} patients", items.len());

    let report = tokio::task::spawn_blocking(move || engine.batch_predict(items)).await?;

    Ok(Json(report))
}
