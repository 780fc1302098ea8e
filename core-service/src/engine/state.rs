//! Engine State - explicit readiness
//!
//! There is no half-loaded engine: either a fully built
//! [`DiagnosticEngine`] exists, or the reason it could not be built does.

use std::sync::Arc;

use super::diagnostic::DiagnosticEngine;
use crate::constants::EngineConfig;
use crate::error::DiagnosticError;

#[derive(Debug, Clone)]
pub enum EngineState {
    Ready(Arc<DiagnosticEngine>),
    Unavailable(String),
}

impl EngineState {
    /// Never fails: a load error becomes `Unavailable` and is logged.
    pub fn initialize(config: &EngineConfig) -> Self {
        match DiagnosticEngine::initialize(config) {
            Ok(engine) => {
                log::info!("Diagnostic engine ready ({} backend)", engine.metadata().backend);
                EngineState::Ready(Arc::new(engine))
            }
            Err(e) => {
                log::error!("Error loading ML model: {}", e);
                EngineState::Unavailable(e.to_string())
            }
        }
    }

    /// The one readiness check on the request path.
    pub fn engine(&self) -> Result<&Arc<DiagnosticEngine>, DiagnosticError> {
        match self {
            EngineState::Ready(engine) => Ok(engine),
            EngineState::Unavailable(_) => Err(DiagnosticError::EngineNotReady),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            EngineState::Ready(_) => None,
            EngineState::Unavailable(reason) => Some(reason),
        }
    }
}

impl From<DiagnosticEngine> for EngineState {
    fn from(engine: DiagnosticEngine) -> Self {
        EngineState::Ready(Arc::new(engine))
    }
}
