//! Error Types - Diagnostic Engine
//!
//! Taxonomy:
//! - `ValidationError`  - caller input is wrong, always recoverable
//! - `ModelLoadError`   - startup only, fatal
//! - `ClassifierError`  - backend failed while running a vector
//! - `DiagnosticError`  - what `predict` / `batch_predict` return

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// VALIDATION
// ============================================================================

/// Bad or incomplete measurement set.
///
/// Lists every offending field (schema order) so the caller can fix
/// everything in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub missing_fields: Vec<String>,
    pub non_numeric_fields: Vec<String>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.non_numeric_fields.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::with_capacity(2);
        if !self.missing_fields.is_empty() {
            parts.push(format!(
                "Missing required features: {}",
                self.missing_fields.join(", ")
            ));
        }
        if !self.non_numeric_fields.is_empty() {
            parts.push(format!(
                "Non-numeric values for features: {}",
                self.non_numeric_fields.join(", ")
            ));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// MODEL LOADING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Required model artifact not found: {0}")]
    MissingArtifact(PathBuf),

    #[error("No classifier artifact in {0} (expected model.onnx or forest.json)")]
    NoClassifier(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Inconsistent model: {0}")]
    Inconsistent(String),

    #[error("Classifier backend failed to load: {0}")]
    Backend(String),
}

// ============================================================================
// INFERENCE
// ============================================================================

#[derive(Debug, Error)]
#[error("ClassifierError: {0}")]
pub struct ClassifierError(pub String);

// ============================================================================
// REQUEST PATH
// ============================================================================

#[derive(Debug, Error)]
pub enum DiagnosticError {
    /// Caller input is at fault; surfaced verbatim.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("ML model not loaded")]
    EngineNotReady,

    /// Batch item without any measurements.
    #[error("No blood data provided")]
    MissingMeasurements,

    /// Batch item whose measurements are not a JSON object.
    #[error("Invalid input: blood data must be a JSON object")]
    MalformedMeasurements,

    /// Internal failure; detail is for logs, not for callers.
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),
}

impl DiagnosticError {
    /// Message safe to hand back across the service boundary.
    pub fn public_message(&self) -> String {
        match self {
            DiagnosticError::PredictionFailure(_) => "Prediction failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ClassifierError> for DiagnosticError {
    fn from(err: ClassifierError) -> Self {
        DiagnosticError::PredictionFailure(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_all_fields() {
        let err = ValidationError {
            missing_fields: vec!["Glucose".into(), "BMI".into()],
            non_numeric_fields: vec![],
        };
        assert_eq!(err.to_string(), "Missing required features: Glucose, BMI");
    }

    #[test]
    fn test_validation_message_combined() {
        let err = ValidationError {
            missing_fields: vec!["Glucose".into()],
            non_numeric_fields: vec!["ALT".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required features: Glucose; Non-numeric values for features: ALT"
        );
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = DiagnosticError::PredictionFailure("tensor shape [1, 3] != [1, 5]".into());
        assert_eq!(err.public_message(), "Prediction failed");
        assert!(err.to_string().contains("tensor shape"));
    }

    #[test]
    fn test_validation_passes_through_verbatim() {
        let err: DiagnosticError = ValidationError {
            missing_fields: vec!["HbA1c".into()],
            non_numeric_fields: vec![],
        }
        .into();
        assert_eq!(err.public_message(), "Invalid input: Missing required features: HbA1c");
    }
}
