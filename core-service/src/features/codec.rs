//! Feature Codec - named measurements -> ordered vector
//!
//! Pure function of (measurements, schema). No range checks here: an
//! out-of-range value is still a valid feature. Range annotation lives in
//! `clinical::ranges`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::FeatureSchema;
use super::vector::FeatureVector;
use crate::error::ValidationError;

// ============================================================================
// MEASUREMENT SET
// ============================================================================

/// Caller-supplied mapping of field name -> value.
///
/// Values stay as raw JSON until encoding so that one bad field can be
/// reported alongside every other bad field. Keys outside the schema are
/// carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSet(Map<String, Value>);

impl MeasurementSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Numeric value of a field, `None` if absent or not coercible.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(coerce_numeric)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for MeasurementSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<MeasurementSet> for Value {
    fn from(set: MeasurementSet) -> Self {
        Value::Object(set.0)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MeasurementSet {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut set = MeasurementSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Numbers and numeric strings are accepted; everything else, including
/// NaN and infinities, is not a measurement.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

// ============================================================================
// ENCODE
// ============================================================================

/// Build the classifier input in schema order.
///
/// Collects every missing and every non-numeric field before failing.
pub fn encode(measurements: &MeasurementSet, schema: &FeatureSchema) -> Result<FeatureVector, ValidationError> {
    let mut values = Vec::with_capacity(schema.len());
    let mut error = ValidationError::default();

    for name in schema.iter() {
        match measurements.get(name) {
            None => error.missing_fields.push(name.to_string()),
            Some(raw) => match coerce_numeric(raw) {
                Some(v) => values.push(v),
                None => error.non_numeric_fields.push(name.to_string()),
            },
        }
    }

    if !error.is_empty() {
        return Err(error);
    }

    Ok(FeatureVector::from_encoded(schema, values))
}
