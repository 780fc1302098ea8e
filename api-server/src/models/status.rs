//! Service status models

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_type: String,
    pub features_count: usize,
    pub classes: Vec<String>,
    pub schema_fingerprint: String,
    pub loaded_at: i64,
    pub timestamp: i64,
}
