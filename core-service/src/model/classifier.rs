//! Classifier contract
//!
//! The engine only knows "vector -> label + distribution". Backends
//! (tree ensemble, ONNX, anything remote) sit behind [`Classifier`].

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, ModelLoadError};
use crate::features::FeatureVector;

// ============================================================================
// LABEL SPACE
// ============================================================================

/// Closed, ordered set of disease classes. Index = class id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSpace {
    labels: Vec<String>,
}

impl LabelSpace {
    pub fn new(labels: Vec<String>) -> Result<Self, ModelLoadError> {
        if labels.is_empty() {
            return Err(ModelLoadError::Invalid("label space is empty".to_string()));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(ModelLoadError::Invalid(format!(
                    "label space lists '{}' twice",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }
}

impl TryFrom<Vec<String>> for LabelSpace {
    type Error = ModelLoadError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<LabelSpace> for Vec<String> {
    fn from(space: LabelSpace) -> Self {
        space.labels
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Raw backend output for one vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Index of the predicted class in the label space
    pub label_index: usize,
    /// One probability per class, same indexing as the label space
    pub probabilities: Vec<f64>,
}

impl Classification {
    /// Probability read at the predicted index (not re-derived via max).
    pub fn confidence(&self) -> Option<f64> {
        self.probabilities.get(self.label_index).copied()
    }
}

/// Tolerance for a distribution to count as summing to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Rejects distributions a consistent classifier could not have produced.
pub fn check_distribution(probabilities: &[f64], n_classes: usize) -> Result<(), ClassifierError> {
    if probabilities.len() != n_classes {
        return Err(ClassifierError(format!(
            "distribution has {} entries, expected {}",
            probabilities.len(),
            n_classes
        )));
    }

    if let Some(bad) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0) {
        return Err(ClassifierError(format!("probability {} outside [0, 1]", bad)));
    }

    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Err(ClassifierError(format!("distribution sums to {}", sum)));
    }

    Ok(())
}

/// Scale non-negative weights so they sum to one.
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / weights.len().max(1) as f64; weights.len()];
    }
    weights.iter().map(|w| w / total).collect()
}

/// First index of the maximum, matching sklearn's argmax tie-breaking.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait cho classifier backends (forest, ONNX, remote, ...)
///
/// Implementations are loaded once and shared read-only across threads;
/// `classify` must not change observable state.
pub trait Classifier: Send + Sync {
    /// Number of classes the backend emits
    fn n_classes(&self) -> usize;

    /// Expected vector length, when the backend knows it
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn classify(&self, vector: &FeatureVector) -> Result<Classification, ClassifierError>;

    /// Short backend tag for status output
    fn backend(&self) -> &'static str;
}
