//! Clinical Module - static reference data
//!
//! Loaded once at startup, read-only afterwards. Independent of the
//! classifier: the range scan never looks at the predicted label.

pub mod reference;
pub mod ranges;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

pub use reference::{ClinicalReference, DiseaseInfo, RiskLevel};
pub use ranges::{AbnormalFinding, AbnormalStatus, NormalRange, NormalRangeTable};

/// Disease guidance plus normal ranges, as one replaceable unit.
///
/// Override file layout:
///
/// ```json
/// {
///   "diseases": { "Healthy": { "risk_level": "Low", "description": "..." } },
///   "normal_ranges": [ { "parameter": "Glucose", "low": 70, "high": 140 } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub diseases: ClinicalReference,
    pub normal_ranges: NormalRangeTable,
}

impl ReferenceTables {
    pub fn builtin() -> Self {
        Self {
            diseases: ClinicalReference::builtin().clone(),
            normal_ranges: NormalRangeTable::builtin().clone(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        log::info!("Loading clinical reference from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::MissingArtifact(path.to_path_buf()));
        }

        let data = fs::read(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables: ReferenceTables = serde_json::from_slice(&data).map_err(|source| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!(
            "Clinical reference: {} diseases, {} normal ranges",
            tables.diseases.len(),
            tables.normal_ranges.len()
        );
        Ok(tables)
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}
