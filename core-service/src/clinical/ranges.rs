//! Normal Ranges - abnormal-parameter scan
//!
//! Bounded check, not clinical validation: only fields listed in the table
//! are ever flagged. Findings come out in table order, whatever the order
//! of the input.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;
use crate::features::MeasurementSet;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub parameter: String,
    pub low: f64,
    pub high: f64,
}

impl NormalRange {
    pub fn new(parameter: impl Into<String>, low: f64, high: f64) -> Self {
        Self { parameter: parameter.into(), low, high }
    }

    /// Inclusive on both ends
    pub fn status_of(&self, value: f64) -> Option<AbnormalStatus> {
        if value < self.low {
            Some(AbnormalStatus::Low)
        } else if value > self.high {
            Some(AbnormalStatus::High)
        } else {
            None
        }
    }

    /// "70-140", "18.5-25", "4-6"
    pub fn display(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbnormalStatus {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbnormalFinding {
    pub parameter: String,
    pub value: f64,
    pub status: AbnormalStatus,
    pub normal_range: String,
}

/// Ordered list of reference bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NormalRange>", into = "Vec<NormalRange>")]
pub struct NormalRangeTable {
    ranges: Vec<NormalRange>,
}

impl NormalRangeTable {
    pub fn new(ranges: Vec<NormalRange>) -> Result<Self, ModelLoadError> {
        for (i, range) in ranges.iter().enumerate() {
            if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                return Err(ModelLoadError::Invalid(format!(
                    "normal range for '{}' is not a valid interval",
                    range.parameter
                )));
            }
            if ranges[..i].iter().any(|r| r.parameter == range.parameter) {
                return Err(ModelLoadError::Invalid(format!(
                    "normal range for '{}' listed twice",
                    range.parameter
                )));
            }
        }
        Ok(Self { ranges })
    }

    /// Approximate adult reference values.
    pub fn builtin() -> &'static NormalRangeTable {
        &BUILTIN_RANGES
    }

    pub fn get(&self, parameter: &str) -> Option<&NormalRange> {
        self.ranges.iter().find(|r| r.parameter == parameter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Flag every listed parameter present in `measurements` that falls
    /// outside its range. Absent or non-numeric values are skipped.
    pub fn scan(&self, measurements: &MeasurementSet) -> Vec<AbnormalFinding> {
        self.ranges
            .iter()
            .filter_map(|range| {
                let value = measurements.numeric(&range.parameter)?;
                let status = range.status_of(value)?;
                Some(AbnormalFinding {
                    parameter: range.parameter.clone(),
                    value,
                    status,
                    normal_range: range.display(),
                })
            })
            .collect()
    }
}

impl TryFrom<Vec<NormalRange>> for NormalRangeTable {
    type Error = ModelLoadError;

    fn try_from(ranges: Vec<NormalRange>) -> Result<Self, Self::Error> {
        Self::new(ranges)
    }
}

impl From<NormalRangeTable> for Vec<NormalRange> {
    fn from(table: NormalRangeTable) -> Self {
        table.ranges
    }
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

static BUILTIN_RANGES: Lazy<NormalRangeTable> = Lazy::new(|| NormalRangeTable {
    ranges: vec![
        NormalRange::new("Glucose", 70.0, 140.0),
        NormalRange::new("Cholesterol", 125.0, 200.0),
        NormalRange::new("Hemoglobin", 12.0, 17.0),
        NormalRange::new("Platelets", 150000.0, 400000.0),
        NormalRange::new("White Blood Cells", 4000.0, 11000.0),
        NormalRange::new("Red Blood Cells", 4.0, 6.0),
        NormalRange::new("Hematocrit", 36.0, 50.0),
        NormalRange::new("HbA1c", 4.0, 5.7),
        NormalRange::new("Triglycerides", 50.0, 150.0),
        NormalRange::new("LDL Cholesterol", 0.0, 100.0),
        NormalRange::new("HDL Cholesterol", 40.0, 100.0),
        NormalRange::new("Systolic Blood Pressure", 90.0, 120.0),
        NormalRange::new("Diastolic Blood Pressure", 60.0, 80.0),
        NormalRange::new("BMI", 18.5, 25.0),
    ],
});

// ============================================================================
// TESTS
// ============================================================================
