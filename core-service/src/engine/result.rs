//! Prediction output types
//!
//! Field names are the wire contract of the service; keep them snake_case.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use serde_json::Value;

use crate::clinical::{AbnormalFinding, RiskLevel};
use crate::features::MeasurementSet;

/// One prediction, built fresh per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: String,
    /// Probability of `disease`, 4 decimals
    pub confidence: f64,
    /// `confidence * 100`, 2 decimals
    pub confidence_percentage: f64,
    /// Full distribution, one entry per label
    pub probabilities: BTreeMap<String, f64>,
    pub risk_level: RiskLevel,
    pub description: String,
    pub patient_message: String,
    pub patient_recommendations: Vec<String>,
    pub doctor_recommendations: Vec<String>,
    pub abnormal_parameters: Vec<AbnormalFinding>,
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// BATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem<I> {
    pub id: I,
    /// Raw as received; checked per item so one malformed entry fails
    /// only itself. `None`, `null` or `{}` mean no measurements.
    pub measurements: Option<Value>,
}

impl<I> BatchItem<I> {
    pub fn new(id: I, measurements: MeasurementSet) -> Self {
        Self { id, measurements: Some(measurements.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Prediction(Box<PredictionResult>),
    Error(String),
}

impl BatchOutcome {
    pub fn is_prediction(&self) -> bool {
        matches!(self, BatchOutcome::Prediction(_))
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            BatchOutcome::Prediction(p) => Some(p.as_ref()),
            BatchOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BatchOutcome::Error(e) => Some(e.as_str()),
            BatchOutcome::Prediction(_) => None,
        }
    }
}

/// Serialises as `{"id": .., "prediction": {..}}` or `{"id": .., "error": ".."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry<I> {
    pub id: I,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<I> {
    /// Same order as the input
    pub results: Vec<BatchEntry<I>>,
    pub total: usize,
    pub successful: usize,
}

impl<I> BatchReport<I> {
    pub fn from_entries(results: Vec<BatchEntry<I>>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.outcome.is_prediction()).count();
        Self { results, total, successful }
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }
}
