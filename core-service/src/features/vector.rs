//! Feature Vector - Classifier input
//!
//! Only produced by a successful [`encode`](super::codec::encode). It carries
//! the fingerprint of the schema it was built against, which shows up in the
//! debug log next to the one `/api/health` reports.

use serde::Serialize;

use super::layout::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// CRC32 of the schema this vector follows
    schema_fingerprint: u32,
    /// Values in schema order
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn from_encoded(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self {
            schema_fingerprint: schema.fingerprint(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Narrowed copy for f32 runtimes (ONNX).
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    /// JSON form for debug logging
    pub fn to_log_entry(&self, schema: &FeatureSchema) -> serde_json::Value {
        serde_json::json!({
            "schema_fingerprint": self.schema_fingerprint,
            "values": self.values,
            "named_values": schema.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}
