//! Model Module - Classifier backends & model store
//!
//! Tách classifier khỏi pipeline: the engine sees only [`Classifier`],
//! so swapping forest / ONNX / remote backends never touches it.

pub mod classifier;
pub mod forest;
pub mod onnx;
pub mod store;

// Re-export common types
pub use classifier::{Classification, Classifier, LabelSpace};
pub use forest::ForestClassifier;
pub use onnx::OnnxClassifier;
pub use store::{LoadedModel, ModelMetadata, ModelStore};
