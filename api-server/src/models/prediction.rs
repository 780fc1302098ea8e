//! Prediction request models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use medora_core::BatchItem;

#[derive(Debug, Deserialize, Validate)]
pub struct BatchPredictRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No patients provided"))]
    pub patients: Vec<PatientRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Echoed back untouched; any JSON value
    #[serde(default)]
    pub id: Value,

    /// Any JSON; a non-object fails this patient only
    #[serde(rename = "bloodData", default)]
    pub blood_data: Option<Value>,
}

impl From<PatientRecord> for BatchItem<Value> {
    fn from(record: PatientRecord) -> Self {
        BatchItem {
            id: record.id,
            measurements: record.blood_data,
        }
    }
}
