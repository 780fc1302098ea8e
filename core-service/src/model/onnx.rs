//! ONNX Classifier - ONNX Runtime backend
//!
//! Expects a scikit-learn classifier exported with `skl2onnx` and
//! `zipmap=False`:
//! - input  `[1, n_features]` f32
//! - output `label`          i64 `[1]`
//! - output `probabilities`  f32 `[1, n_classes]`
//!
//! `Session::run` needs exclusive access, so the session sits behind a
//! mutex. Everything else about the backend is immutable after load.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;

use super::classifier::{normalize, Classification, Classifier};
use crate::error::{ClassifierError, ModelLoadError};
use crate::features::FeatureVector;

/// Output names written by skl2onnx
pub const LABEL_OUTPUT: &str = "label";
pub const PROBABILITIES_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    session: Mutex<Session>,
    n_features: usize,
    n_classes: usize,
    label_output: String,
    probabilities_output: String,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("n_features", &self.n_features)
            .field("n_classes", &self.n_classes)
            .field("label_output", &self.label_output)
            .field("probabilities_output", &self.probabilities_output)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model từ file
    pub fn load(model_path: &Path, n_features: usize, n_classes: usize) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelLoadError::MissingArtifact(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Backend(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Backend(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::Backend(format!("Failed to load model: {}", e)))?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
        let (label_output, probabilities_output) = resolve_outputs(&output_names)?;

        // Dynamic dimensions (-1) are unknown and only caught at run time
        let model_features = session.inputs().first().and_then(|i| known_last_dim(i.dtype()));
        let model_classes = session
            .outputs()
            .iter()
            .find(|o| o.name() == probabilities_output)
            .and_then(|o| known_last_dim(o.dtype()));
        check_dimensions(model_features, model_classes, n_features, n_classes)?;

        log::info!(
            "ONNX model loaded (outputs: {}, {})",
            label_output,
            probabilities_output
        );

        Ok(Self {
            session: Mutex::new(session),
            n_features,
            n_classes,
            label_output,
            probabilities_output,
        })
    }
}

/// Pick the label/probability outputs by name, falling back to position.
fn resolve_outputs(names: &[String]) -> Result<(String, String), ModelLoadError> {
    let by_name = |wanted: &str| names.iter().find(|n| n.as_str() == wanted).cloned();

    match (by_name(LABEL_OUTPUT), by_name(PROBABILITIES_OUTPUT)) {
        (Some(label), Some(proba)) => Ok((label, proba)),
        _ if names.len() >= 2 => Ok((names[0].clone(), names[1].clone())),
        _ => Err(ModelLoadError::Backend(format!(
            "classifier must expose label and probability outputs, found {:?}",
            names
        ))),
    }
}

/// Last dimension of a tensor outlet, `None` when dynamic or not a tensor.
fn known_last_dim(dtype: &ValueType) -> Option<usize> {
    dtype
        .tensor_shape()
        .and_then(|shape| shape.last().copied())
        .and_then(|dim| usize::try_from(dim).ok())
}

/// The graph must agree with the schema and label space wherever it
/// declares a fixed size.
fn check_dimensions(
    model_features: Option<usize>,
    model_classes: Option<usize>,
    n_features: usize,
    n_classes: usize,
) -> Result<(), ModelLoadError> {
    if let Some(n) = model_features.filter(|n| *n != n_features) {
        return Err(ModelLoadError::Inconsistent(format!(
            "ONNX input takes {} features, schema has {}",
            n, n_features
        )));
    }
    if let Some(n) = model_classes.filter(|n| *n != n_classes) {
        return Err(ModelLoadError::Inconsistent(format!(
            "ONNX model emits {} probabilities, label space has {}",
            n, n_classes
        )));
    }
    Ok(())
}

impl Classifier for OnnxClassifier {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn classify(&self, vector: &FeatureVector) -> Result<Classification, ClassifierError> {
        if vector.len() != self.n_features {
            return Err(ClassifierError(format!(
                "vector has {} features, model expects {}",
                vector.len(),
                self.n_features
            )));
        }

        let input_array = Array2::<f32>::from_shape_vec((1, self.n_features), vector.to_f32())
            .map_err(|e| ClassifierError(format!("Array error: {}", e)))?;

        let input_tensor = Tensor::from_array(input_array)
            .map_err(|e| ClassifierError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError(format!("Inference failed: {}", e)))?;

        let label_index = {
            let output = outputs
                .get(self.label_output.as_str())
                .ok_or_else(|| ClassifierError("No label output".to_string()))?;
            let (_, data) = output
                .try_extract_tensor::<i64>()
                .map_err(|e| ClassifierError(format!("Extract label error: {}", e)))?;
            let raw = *data
                .first()
                .ok_or_else(|| ClassifierError("Empty label output".to_string()))?;
            usize::try_from(raw).map_err(|_| ClassifierError(format!("Negative class id {}", raw)))?
        };

        let weights: Vec<f64> = {
            let output = outputs
                .get(self.probabilities_output.as_str())
                .ok_or_else(|| ClassifierError("No probabilities output".to_string()))?;
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| ClassifierError(format!("Extract probabilities error: {}", e)))?;
            data.iter().map(|&p| p as f64).collect()
        };

        if weights.len() != self.n_classes {
            return Err(ClassifierError(format!(
                "model emitted {} probabilities, label space has {}",
                weights.len(),
                self.n_classes
            )));
        }

        // f32 rounding leaves the sum a few ulps off one
        Ok(Classification {
            label_index,
            probabilities: normalize(&weights),
        })
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}
