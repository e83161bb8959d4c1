//! Tree-ensemble classifier with soft voting
//!
//! Each tree yields a class distribution from the leaf it lands in; the
//! ensemble probability is the mean over trees.

use super::tree::{Tree, N_CLASSES};
use crate::classifier::{ChurnClassifier, CHURN_CLASS, STAY_CLASS};
use crate::errors::{InferenceFailure, InferenceResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Forest decoding and validation errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Only supported artifact format version
pub const FORMAT_VERSION: i32 = 1;

/// Binary random-forest style classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    /// Artifact format version
    pub version: i32,

    /// Width of the rows the trees were trained on
    pub n_features: usize,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,
}

impl ForestModel {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Self {
        Self {
            version: FORMAT_VERSION,
            n_features,
            trees,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.n_features == 0 {
            return Err(ModelError::ValidationFailed(
                "n_features must be positive".to_string(),
            ));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                ModelError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Decode and validate a model from JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: ForestModel = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    /// Load model from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Save model to a pretty-printed JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_row(&self, features: &[f64]) -> InferenceResult<()> {
        if features.len() != self.n_features {
            return Err(InferenceFailure::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        Ok(())
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, features: &[f64]) -> InferenceResult<[f64; N_CLASSES]> {
        self.check_row(features)?;

        let mut sum = [0.0f64; N_CLASSES];
        for (i, tree) in self.trees.iter().enumerate() {
            let dist = tree
                .evaluate(features)
                .map_err(|reason| InferenceFailure::MalformedTree { tree: i, reason })?;
            sum[0] += dist[0];
            sum[1] += dist[1];
        }

        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

impl ChurnClassifier for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probabilities(&self, features: &[f64]) -> InferenceResult<[f64; 2]> {
        self.predict_proba(features)
    }

    /// First index of the maximum probability, so ties go to class 0
    fn predict_class(&self, features: &[f64]) -> InferenceResult<u8> {
        let [stay, churn] = self.predict_proba(features)?;
        Ok(if churn > stay { CHURN_CLASS } else { STAY_CLASS })
    }
}
