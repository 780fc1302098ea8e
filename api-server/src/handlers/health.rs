//! Health check handlers

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{HealthResponse, ServiceInfo},
    AppState,
};

/// GET / - liveness, answers even without a model
pub async fn home(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Medora Disease Prediction API",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.engine.is_ready(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// GET /api/health - readiness
pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let engine = state.engine.engine()?;
    let metadata = engine.metadata();

    Ok(Json(HealthResponse {
        status: "healthy",
        model_type: metadata.backend.clone(),
        features_count: metadata.feature_count,
        classes: metadata.labels.clone(),
        schema_fingerprint: format!("{:08x}", metadata.schema_fingerprint),
        loaded_at: metadata.loaded_at.timestamp(),
        timestamp: chrono::Utc::now().timestamp(),
    }))
}
