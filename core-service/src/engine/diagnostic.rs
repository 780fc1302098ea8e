//! Diagnostic Engine - encode -> classify -> annotate
//!
//! Owns the loaded classifier, label space, schema and reference tables.
//! All of it is immutable after construction, so `&DiagnosticEngine` can be
//! shared across threads and `predict` needs no locking.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use super::result::{round_to, BatchEntry, BatchItem, BatchOutcome, BatchReport, PredictionResult};
use crate::clinical::ReferenceTables;
use crate::constants::{EngineConfig, CONFIDENCE_DECIMALS, PERCENTAGE_DECIMALS};
use crate::error::{DiagnosticError, ModelLoadError};
use crate::features::{encode, FeatureSchema, MeasurementSet};
use crate::model::classifier::check_distribution;
use crate::model::store::check_consistency;
use crate::model::{Classifier, LabelSpace, LoadedModel, ModelMetadata, ModelStore};

pub struct DiagnosticEngine {
    classifier: Box<dyn Classifier>,
    labels: LabelSpace,
    schema: FeatureSchema,
    reference: ReferenceTables,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for DiagnosticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticEngine")
            .field("backend", &self.classifier.backend())
            .field("labels", &self.labels)
            .field("features", &self.schema.len())
            .finish()
    }
}

impl DiagnosticEngine {
    /// Load model store + reference tables. Nothing is returned unless
    /// every artifact loaded.
    pub fn initialize(config: &EngineConfig) -> Result<Self, ModelLoadError> {
        let model = ModelStore::new(config.model_dir.clone()).load()?;

        let reference = match &config.reference_path {
            Some(path) => ReferenceTables::load(path)?,
            None => ReferenceTables::builtin(),
        };

        Ok(Self::from_loaded(model, reference))
    }

    /// Assemble from an in-memory classifier (tests, embedded backends).
    pub fn new(
        classifier: Box<dyn Classifier>,
        labels: LabelSpace,
        schema: FeatureSchema,
        reference: ReferenceTables,
    ) -> Result<Self, ModelLoadError> {
        check_consistency(classifier.as_ref(), &schema, &labels)?;

        let metadata = ModelMetadata {
            model_dir: "<memory>".to_string(),
            backend: classifier.backend().to_string(),
            labels: labels.to_vec(),
            feature_count: schema.len(),
            schema_fingerprint: schema.fingerprint(),
            schema_from_store: false,
            loaded_at: Utc::now(),
        };

        Ok(Self::from_loaded(
            LoadedModel { classifier, labels, schema, metadata },
            reference,
        ))
    }

    fn from_loaded(model: LoadedModel, reference: ReferenceTables) -> Self {
        for label in model.labels.iter() {
            if reference.diseases.get(label).is_none() {
                log::warn!("No clinical reference for label '{}' - it will report risk Unknown", label);
            }
        }
        for label in reference.diseases.labels() {
            if model.labels.index_of(label).is_none() {
                log::debug!("Clinical reference entry '{}' matches no model label", label);
            }
        }

        Self {
            classifier: model.classifier,
            labels: model.labels,
            schema: model.schema,
            reference,
            metadata: model.metadata,
        }
    }

    pub fn labels(&self) -> &LabelSpace {
        &self.labels
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn reference(&self) -> &ReferenceTables {
        &self.reference
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    // ========================================================================
    // PREDICTION
    // ========================================================================

    pub fn predict(&self, measurements: &MeasurementSet) -> Result<PredictionResult, DiagnosticError> {
        let start_time = Instant::now();

        // Caller's fault: pass through untouched
        let vector = encode(measurements, &self.schema)?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Encoded input: {}", vector.to_log_entry(&self.schema));
        }

        let classification = self
            .classifier
            .classify(&vector)
            .map_err(|e| self.failure(e.0))?;

        check_distribution(&classification.probabilities, self.labels.len())
            .map_err(|e| self.failure(e.0))?;

        let disease = self
            .labels
            .get(classification.label_index)
            .ok_or_else(|| self.failure(format!("class id {} outside label space", classification.label_index)))?;

        let confidence = classification
            .confidence()
            .ok_or_else(|| self.failure("no probability at predicted index".to_string()))?;

        let probabilities: BTreeMap<String, f64> = self
            .labels
            .iter()
            .zip(classification.probabilities.iter())
            .map(|(label, p)| (label.to_string(), *p))
            .collect();

        let info = self.reference.diseases.describe(disease);
        let abnormal_parameters = self.reference.normal_ranges.scan(measurements);

        log::debug!(
            "Predicted {} ({:.4}) in {}us, {} abnormal parameters",
            disease,
            confidence,
            start_time.elapsed().as_micros(),
            abnormal_parameters.len()
        );

        Ok(PredictionResult {
            disease: disease.to_string(),
            confidence: round_to(confidence, CONFIDENCE_DECIMALS),
            confidence_percentage: round_to(confidence * 100.0, PERCENTAGE_DECIMALS),
            probabilities,
            risk_level: info.risk_level,
            description: info.description,
            patient_message: info.patient_message,
            patient_recommendations: info.patient_recommendations,
            doctor_recommendations: info.doctor_recommendations,
            abnormal_parameters,
        })
    }

    /// Each item runs on its own; one bad item never stops the rest.
    /// Results keep input order, ids untouched.
    pub fn batch_predict<I>(&self, items: Vec<BatchItem<I>>) -> BatchReport<I> {
        let results: Vec<BatchEntry<I>> = items
            .into_iter()
            .map(|item| {
                let outcome = match item.measurements {
                    None | Some(Value::Null) => Err(DiagnosticError::MissingMeasurements),
                    Some(Value::Object(map)) if map.is_empty() => Err(DiagnosticError::MissingMeasurements),
                    Some(Value::Object(map)) => self.predict(&MeasurementSet::from(map)),
                    Some(_) => Err(DiagnosticError::MalformedMeasurements),
                };

                let outcome = match outcome {
                    Ok(prediction) => BatchOutcome::Prediction(Box::new(prediction)),
                    Err(e) => BatchOutcome::Error(e.public_message()),
                };

                BatchEntry { id: item.id, outcome }
            })
            .collect();

        let report = BatchReport::from_entries(results);
        log::info!(
            "Batch prediction: {}/{} successful, {} failed",
            report.successful,
            report.total,
            report.failed()
        );
        report
    }

    /// Log full detail, hand back an internal failure.
    fn failure(&self, detail: String) -> DiagnosticError {
        log::error!("Prediction failed ({} backend): {}", self.classifier.backend(), detail);
        DiagnosticError::PredictionFailure(detail)
    }
}
