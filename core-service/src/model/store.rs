//! Model Store - artifact directory loader
//!
//! ```text
//! models/
//! ├── labels.json          required  ["Anemia", "Diabetes", ...]
//! ├── model.onnx           one of    ONNX classifier (preferred)
//! ├── forest.json          one of    portable tree ensemble
//! ├── feature_names.json   optional  schema, default layout otherwise
//! └── manifest.json        optional  {"sha256": {"model.onnx": "<hex>"}}
//! ```
//!
//! Either everything loads and agrees with everything else, or nothing is
//! returned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::{Classifier, LabelSpace};
use super::forest::ForestClassifier;
use super::onnx::OnnxClassifier;
use crate::error::ModelLoadError;
use crate::features::FeatureSchema;

pub const LABELS_FILE: &str = "labels.json";
pub const ONNX_FILE: &str = "model.onnx";
pub const FOREST_FILE: &str = "forest.json";
pub const FEATURES_FILE: &str = "feature_names.json";
pub const MANIFEST_FILE: &str = "manifest.json";

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Optional integrity manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// artifact file name -> lowercase hex SHA-256
    #[serde(default)]
    pub sha256: BTreeMap<String, String>,
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_dir: String,
    pub backend: String,          // "onnx" or "forest"
    pub labels: Vec<String>,
    pub feature_count: usize,
    pub schema_fingerprint: u32,
    pub schema_from_store: bool,
    pub loaded_at: DateTime<Utc>,
}

/// Everything the engine needs from the store, fully validated.
pub struct LoadedModel {
    pub classifier: Box<dyn Classifier>,
    pub labels: LabelSpace,
    pub schema: FeatureSchema,
    pub metadata: ModelMetadata,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("backend", &self.classifier.backend())
            .field("labels", &self.labels)
            .field("schema", &self.schema)
            .finish()
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn load(&self) -> Result<LoadedModel, ModelLoadError> {
        log::info!("Loading model store from: {}", self.root.display());

        if let Some(manifest) = self.read_optional::<Manifest>(MANIFEST_FILE)? {
            self.verify_checksums(&manifest)?;
        }

        let labels: LabelSpace = self.read_required(LABELS_FILE)?;
        log::info!("Label space: {} classes", labels.len());

        let (schema, schema_from_store) = match self.read_optional::<FeatureSchema>(FEATURES_FILE)? {
            Some(schema) => (schema, true),
            None => {
                log::info!("{} not found - using default blood panel layout", FEATURES_FILE);
                (FeatureSchema::default_layout(), false)
            }
        };
        log::info!("Features: {} parameters", schema.len());

        let classifier = self.load_classifier(&schema, &labels)?;
        check_consistency(classifier.as_ref(), &schema, &labels)?;

        let metadata = ModelMetadata {
            model_dir: self.root.display().to_string(),
            backend: classifier.backend().to_string(),
            labels: labels.to_vec(),
            feature_count: schema.len(),
            schema_fingerprint: schema.fingerprint(),
            schema_from_store,
            loaded_at: Utc::now(),
        };

        log::info!(
            "Model ready: backend={}, schema={:08x}",
            metadata.backend,
            metadata.schema_fingerprint
        );

        Ok(LoadedModel { classifier, labels, schema, metadata })
    }

    fn load_classifier(&self, schema: &FeatureSchema, labels: &LabelSpace) -> Result<Box<dyn Classifier>, ModelLoadError> {
        let onnx_path = self.path(ONNX_FILE);
        if onnx_path.exists() {
            let onnx = OnnxClassifier::load(&onnx_path, schema.len(), labels.len())?;
            return Ok(Box::new(onnx));
        }

        if self.path(FOREST_FILE).exists() {
            // deserialising validates the tree structure
            let forest: ForestClassifier = self.read_required(FOREST_FILE)?;
            log::info!("Forest loaded: {} trees", forest.trees().len());
            return Ok(Box::new(forest));
        }

        Err(ModelLoadError::NoClassifier(self.root.clone()))
    }

    fn verify_checksums(&self, manifest: &Manifest) -> Result<(), ModelLoadError> {
        for (artifact, expected) in &manifest.sha256 {
            // plain names relative to the store only
            let contained = Path::new(artifact)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if artifact.is_empty() || !contained {
                return Err(ModelLoadError::Invalid(format!(
                    "manifest entry '{}' is outside the model directory",
                    artifact
                )));
            }

            let path = self.path(artifact);
            if !path.exists() {
                return Err(ModelLoadError::MissingArtifact(path));
            }
            let bytes = fs::read(&path).map_err(|source| ModelLoadError::Io { path: path.clone(), source })?;
            let actual = sha256_hex(&bytes);

            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(ModelLoadError::ChecksumMismatch {
                    artifact: artifact.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
            log::debug!("Checksum ok: {}", artifact);
        }
        Ok(())
    }

    fn read_required<T: DeserializeOwned>(&self, file: &str) -> Result<T, ModelLoadError> {
        self.read_optional(file)?
            .ok_or_else(|| ModelLoadError::MissingArtifact(self.path(file)))
    }

    fn read_optional<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, ModelLoadError> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path).map_err(|source| ModelLoadError::Io { path: path.clone(), source })?;
        let value = serde_json::from_slice(&data).map_err(|source| ModelLoadError::Corrupt { path, source })?;
        Ok(Some(value))
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Classifier, label space and schema must describe the same problem.
pub fn check_consistency(classifier: &dyn Classifier, schema: &FeatureSchema, labels: &LabelSpace) -> Result<(), ModelLoadError> {
    if classifier.n_classes() != labels.len() {
        return Err(ModelLoadError::Inconsistent(format!(
            "classifier emits {} classes, label space has {}",
            classifier.n_classes(),
            labels.len()
        )));
    }

    if let Some(n) = classifier.n_features() {
        if n != schema.len() {
            return Err(ModelLoadError::Inconsistent(format!(
                "classifier expects {} features, schema has {}",
                n,
                schema.len()
            )));
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DEFAULT_FEATURE_COUNT;

    const LABELS: &str = r#"["Anemia","Diabetes","Healthy","Thalasse","Thromboc"]"#;

    fn stump_forest(n_features: usize, n_classes: usize) -> String {
        let mut left = vec![0.0; n_classes];
        let mut right = vec![0.0; n_classes];
        left[0] = 1.0;
        right[n_classes - 1] = 1.0;
        serde_json::json!({
            "n_features": n_features,
            "n_classes": n_classes,
            "trees": [{ "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": left },
                { "value": right }
            ]}]
        })
        .to_string()
    }

    fn write(dir: &Path, file: &str, contents: &str) {
        fs::write(dir.join(file), contents).unwrap();
    }

    #[test]
    fn test_load_forest_with_default_schema() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, &stump_forest(DEFAULT_FEATURE_COUNT, 5));

        let loaded = ModelStore::new(dir.path()).load().unwrap();

        assert_eq!(loaded.labels.len(), 5);
        assert_eq!(loaded.schema, FeatureSchema::default_layout());
        assert_eq!(loaded.metadata.backend, "forest");
        assert!(!loaded.metadata.schema_from_store);
        assert_eq!(loaded.metadata.schema_fingerprint, FeatureSchema::default_layout().fingerprint());
    }

    #[test]
    fn test_load_uses_stored_schema() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FEATURES_FILE, r#"["Glucose","Hemoglobin","Platelets"]"#);
        write(dir.path(), FOREST_FILE, &stump_forest(3, 5));

        let loaded = ModelStore::new(dir.path()).load().unwrap();
        assert_eq!(loaded.schema.len(), 3);
        assert!(loaded.metadata.schema_from_store);
    }

    #[test]
    fn test_missing_labels_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), FOREST_FILE, &stump_forest(DEFAULT_FEATURE_COUNT, 5));

        let err = ModelStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingArtifact(p) if p.ends_with(LABELS_FILE)));
    }

    #[test]
    fn test_missing_classifier_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);

        let err = ModelStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ModelLoadError::NoClassifier(_)));
    }

    #[test]
    fn test_corrupt_artifacts_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, "[\"Anemia\", ");
        write(dir.path(), FOREST_FILE, &stump_forest(DEFAULT_FEATURE_COUNT, 5));
        assert!(matches!(
            ModelStore::new(dir.path()).load().unwrap_err(),
            ModelLoadError::Corrupt { .. }
        ));

        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, "{\"n_features\": 24}");
        assert!(matches!(
            ModelStore::new(dir.path()).load().unwrap_err(),
            ModelLoadError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_class_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, &stump_forest(DEFAULT_FEATURE_COUNT, 3));

        let err = ModelStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ModelLoadError::Inconsistent(_)));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, &stump_forest(10, 5));

        let err = ModelStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ModelLoadError::Inconsistent(_)));
    }

    #[test]
    fn test_manifest_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let forest = stump_forest(DEFAULT_FEATURE_COUNT, 5);
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, &forest);

        let good = serde_json::json!({ "sha256": {
            "forest.json": sha256_hex(forest.as_bytes()),
            "labels.json": sha256_hex(LABELS.as_bytes()).to_uppercase(),
        }});
        write(dir.path(), MANIFEST_FILE, &good.to_string());
        assert!(ModelStore::new(dir.path()).load().is_ok());

        let bad = serde_json::json!({ "sha256": { "forest.json": sha256_hex(b"tampered") }});
        write(dir.path(), MANIFEST_FILE, &bad.to_string());
        assert!(matches!(
            ModelStore::new(dir.path()).load().unwrap_err(),
            ModelLoadError::ChecksumMismatch { .. }
        ));

        let missing = serde_json::json!({ "sha256": { "model.onnx": "00" }});
        write(dir.path(), MANIFEST_FILE, &missing.to_string());
        assert!(matches!(
            ModelStore::new(dir.path()).load().unwrap_err(),
            ModelLoadError::MissingArtifact(_)
        ));
    }

    #[test]
    fn test_manifest_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), LABELS_FILE, LABELS);
        write(dir.path(), FOREST_FILE, &stump_forest(DEFAULT_FEATURE_COUNT, 5));

        for entry in ["../../etc/shadow", "/etc/shadow", "sub/../forest.json", ""] {
            let manifest = serde_json::json!({ "sha256": { entry: "00" }});
            write(dir.path(), MANIFEST_FILE, &manifest.to_string());
            assert!(
                matches!(ModelStore::new(dir.path()).load().unwrap_err(), ModelLoadError::Invalid(_)),
                "{} accepted",
                entry
            );
        }
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
