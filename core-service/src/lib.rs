//! Medora Core - blood panel diagnostic engine
//!
//! Turns a named set of blood-test measurements into a predicted disease
//! class, per-class confidence, a risk tier, guidance text and a list of
//! out-of-range measurements.
//!
//! ## Layout
//! - `features/` - schema, measurement encoding
//! - `model/`    - classifier trait, forest & ONNX backends, model store
//! - `clinical/` - disease guidance, normal ranges
//! - `engine/`   - `DiagnosticEngine`, results, readiness state

pub mod constants;
pub mod error;
pub mod features;
pub mod model;
pub mod clinical;
pub mod engine;

pub use constants::EngineConfig;
pub use error::{ClassifierError, DiagnosticError, ModelLoadError, ValidationError};
pub use features::{FeatureSchema, FeatureVector, MeasurementSet};
pub use model::{Classification, Classifier, LabelSpace, ModelMetadata};
pub use clinical::{AbnormalFinding, AbnormalStatus, ReferenceTables, RiskLevel};
pub use engine::{BatchItem, BatchOutcome, BatchReport, DiagnosticEngine, EngineState, PredictionResult};
