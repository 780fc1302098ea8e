//! Engine Module - prediction pipeline
//!
//! ```text
//! MeasurementSet ─▶ encode ─▶ Classifier::classify ─▶ annotate ─▶ PredictionResult
//!                                                        ▲
//!                              ReferenceTables ──────────┘
//! ```

pub mod diagnostic;
pub mod result;
pub mod state;


pub use diagnostic::DiagnosticEngine;
pub use result::{BatchEntry, BatchItem, BatchOutcome, BatchReport, PredictionResult};
pub use state::EngineState;
