//! Forest Classifier - portable tree ensemble
//!
//! Evaluates a random forest exported to JSON (`forest.json`), no native
//! runtime needed. Semantics follow scikit-learn:
//! - split nodes go left when `x[feature] <= threshold`
//! - leaf weights (class counts or fractions) are normalised per tree
//! - forest distribution = mean over trees, label = first argmax
//!
//! ```json
//! {
//!   "n_features": 24,
//!   "n_classes": 5,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 2, "threshold": 12.0, "left": 1, "right": 2 },
//!         { "value": [4.0, 0.0, 1.0, 0.0, 0.0] },
//!         { "value": [0.0, 0.0, 9.0, 0.0, 0.0] }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::classifier::{argmax, normalize, Classification, Classifier};
use crate::error::{ClassifierError, ModelLoadError};
use crate::features::FeatureVector;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

/// Only constructed through [`ForestClassifier::new`] or deserialisation,
/// both of which validate, so evaluation can index without checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ForestParts")]
pub struct ForestClassifier {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

#[derive(Deserialize)]
struct ForestParts {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<ForestParts> for ForestClassifier {
    type Error = ModelLoadError;

    fn try_from(parts: ForestParts) -> Result<Self, Self::Error> {
        Self::new(parts.n_features, parts.n_classes, parts.trees)
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

impl DecisionTree {
    /// Structural checks; also rejects cycles reachable from the root.
    fn validate(&self, tree_idx: usize, n_features: usize, n_classes: usize) -> Result<(), ModelLoadError> {
        let invalid = |msg: String| ModelLoadError::Invalid(format!("tree {}: {}", tree_idx, msg));

        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(invalid(format!("node {} splits on feature {} of {}", i, feature, n_features)));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} has non-finite threshold", i)));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(invalid(format!("node {} points outside the tree", i)));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(invalid(format!("leaf {} has {} weights, expected {}", i, value.len(), n_classes)));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(invalid(format!("leaf {} has a negative or non-finite weight", i)));
                    }
                }
            }
        }

        // Every path from the root must reach a leaf
        let mut state = vec![0u8; self.nodes.len()]; // 0 = unseen, 1 = on stack, 2 = done
        let mut stack = vec![(0usize, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                state[idx] = 2;
                continue;
            }
            match state[idx] {
                1 => return Err(invalid(format!("cycle through node {}", idx))),
                2 => continue,
                _ => {}
            }
            state[idx] = 1;
            stack.push((idx, true));
            if let TreeNode::Split { left, right, .. } = &self.nodes[idx] {
                for child in [*left, *right] {
                    if state[child] == 1 {
                        return Err(invalid(format!("cycle through node {}", child)));
                    }
                    if state[child] == 0 {
                        stack.push((child, false));
                    }
                }
            }
        }

        Ok(())
    }

    /// Normalised class distribution of the leaf `values` lands in.
    fn predict_proba(&self, values: &[f64]) -> Vec<f64> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if values[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return normalize(value),
            }
        }
    }
}

impl ForestClassifier {
    pub fn new(n_features: usize, n_classes: usize, trees: Vec<DecisionTree>) -> Result<Self, ModelLoadError> {
        let forest = Self { n_features, n_classes, trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        serde_json::from_slice(bytes).map_err(|e| ModelLoadError::Invalid(format!("forest: {}", e)))
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.n_features == 0 || self.n_classes == 0 {
            return Err(ModelLoadError::Invalid(
                "forest needs at least one feature and one class".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(ModelLoadError::Invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features, self.n_classes)?;
        }
        Ok(())
    }

    /// Mean of per-tree distributions
    pub fn predict_proba(&self, values: &[f64]) -> Vec<f64> {
        let mut acc = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict_proba(values)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter().map(|a| a / n).collect()
    }
}

// ============================================================================
// CLASSIFIER IMPL
// ============================================================================

impl Classifier for ForestClassifier {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn classify(&self, vector: &FeatureVector) -> Result<Classification, ClassifierError> {
        if vector.len() != self.n_features {
            return Err(ClassifierError(format!(
                "vector has {} features, forest expects {}",
                vector.len(),
                self.n_features
            )));
        }

        let probabilities = self.predict_proba(vector.as_slice());
        let label_index = argmax(&probabilities)
            .ok_or_else(|| ClassifierError("empty distribution".to_string()))?;

        Ok(Classification { label_index, probabilities })
    }

    fn backend(&self) -> &'static str {
        "forest"
    }
}

// ============================================================================
// TESTS
// ============================================================================
