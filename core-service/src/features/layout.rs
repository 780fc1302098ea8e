//! Feature Layout - Blood Panel Schema
//!
//! **The order of `DEFAULT_FEATURE_LAYOUT` is the order the classifier was
//! trained on.** Never sort it, never derive it from request input.
//!
//! A model store may ship its own `feature_names.json`; when it does not,
//! the compiled-in layout below is used.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

// ============================================================================
// DEFAULT LAYOUT (Authoritative fallback)
// ============================================================================

pub const DEFAULT_FEATURE_LAYOUT: &[&str] = &[
    // === Metabolic (0-1) ===
    "Glucose",
    "Cholesterol",

    // === Complete blood count (2-9) ===
    "Hemoglobin",
    "Platelets",
    "White Blood Cells",
    "Red Blood Cells",
    "Hematocrit",
    "Mean Corpuscular Volume",
    "Mean Corpuscular Hemoglobin",
    "Mean Corpuscular Hemoglobin Concentration",

    // === Metabolic / anthropometric (10-11) ===
    "Insulin",
    "BMI",

    // === Blood pressure (12-13) ===
    "Systolic Blood Pressure",
    "Diastolic Blood Pressure",

    // === Lipids & glycation (14-17) ===
    "Triglycerides",
    "HbA1c",
    "LDL Cholesterol",
    "HDL Cholesterol",

    // === Liver (18-19) ===
    "ALT",
    "AST",

    // === Cardiac / renal / inflammation (20-23) ===
    "Heart Rate",
    "Creatinine",
    "Troponin",
    "C-reactive Protein",
];

/// Must match DEFAULT_FEATURE_LAYOUT.len()
pub const DEFAULT_FEATURE_COUNT: usize = 24;

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered, duplicate-free list of field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty layouts and duplicate names.
    pub fn new(names: Vec<String>) -> Result<Self, ModelLoadError> {
        if names.is_empty() {
            return Err(ModelLoadError::Invalid("feature schema is empty".to_string()));
        }

        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ModelLoadError::Invalid(format!(
                    "feature schema entry {} is blank",
                    i
                )));
            }
            if names[..i].contains(name) {
                return Err(ModelLoadError::Invalid(format!(
                    "feature schema lists '{}' twice",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    /// The compiled-in 24-field blood panel.
    pub fn default_layout() -> Self {
        Self {
            names: DEFAULT_FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// O(n) but schemas are small
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// CRC32 over the ordered names, used to spot schema drift between deploys.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = Hasher::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }
        hasher.finalize()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = ModelLoadError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}

// ============================================================================
// TESTS
// ============================================================================
