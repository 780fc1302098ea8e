//! Central Configuration Constants
//!
//! Single source of truth for engine defaults. Every value can be
//! overridden from the environment.

use std::path::PathBuf;

/// Default model store directory
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Env var for the model store directory
pub const MODEL_DIR_ENV: &str = "MEDORA_MODEL_DIR";

/// Env var for an optional clinical reference override file
pub const REFERENCE_PATH_ENV: &str = "MEDORA_REFERENCE_PATH";

/// Decimal places of the primary confidence figure
pub const CONFIDENCE_DECIMALS: i32 = 4;

/// Decimal places of the percentage convenience figure
pub const PERCENTAGE_DECIMALS: i32 = 2;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model directory from environment or use default
pub fn get_model_dir() -> PathBuf {
    std::env::var(MODEL_DIR_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR))
}

/// Get clinical reference override path, if any
pub fn get_reference_path() -> Option<PathBuf> {
    std::env::var(REFERENCE_PATH_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Everything `DiagnosticEngine::initialize` needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub model_dir: PathBuf,
    pub reference_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            model_dir: get_model_dir(),
            reference_path: get_reference_path(),
        }
    }

    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            reference_path: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_model_dir(DEFAULT_MODEL_DIR)
    }
}
