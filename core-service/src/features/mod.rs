//! Features Module - Measurement encoding
//!
//! Turns a loosely structured measurement set into the exact vector shape
//! the classifier was trained on.

pub mod layout;
pub mod vector;
pub mod codec;

#[cfg(test)]
mod tests;

pub use layout::{FeatureSchema, DEFAULT_FEATURE_COUNT, DEFAULT_FEATURE_LAYOUT};
pub use vector::FeatureVector;
pub use codec::{encode, coerce_numeric, MeasurementSet};
