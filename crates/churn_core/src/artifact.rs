//! Loading the classifier and its trained feature list from disk

use crate::errors::{ArtifactKind, StartupFailure, StartupResult};
use crate::features::unproduced_features;
use crate::forest::ForestModel;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// What was loaded, for startup reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInfo {
    pub model_path: PathBuf,
    pub features_path: PathBuf,
    /// blake3 of the model file bytes, hex encoded
    pub model_hash: String,
    pub model_size_bytes: u64,
    pub num_trees: usize,
    pub model_n_features: usize,
    pub feature_count: usize,
}

/// The classifier together with the column order it was trained on
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub model: ForestModel,
    pub feature_names: Vec<String>,
    pub info: ArtifactInfo,
}

/// Compute the hex-encoded blake3 digest of artifact bytes
pub fn artifact_hash_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

fn read_artifact(kind: ArtifactKind, path: &Path) -> StartupResult<Vec<u8>> {
    fs::read(path).map_err(|source| StartupFailure::MissingArtifact {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Decode the trained feature list: a non-empty JSON array of unique names
pub fn parse_feature_list(bytes: &[u8]) -> Result<Vec<String>, String> {
    let names: Vec<String> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    if names.is_empty() {
        return Err("feature list is empty".to_string());
    }

    let mut seen = HashSet::new();
    for name in &names {
        if name.trim().is_empty() {
            return Err("feature list contains an empty name".to_string());
        }
        if !seen.insert(name.as_str()) {
            return Err(format!("duplicate feature name: {name}"));
        }
    }

    Ok(names)
}

/// Read and validate both artifacts.
///
/// A file that cannot be read is [`StartupFailure::MissingArtifact`]; one
/// that does not decode or validate is [`StartupFailure::CorruptArtifact`].
#[instrument(skip_all, fields(model = %model_path.display(), features = %features_path.display()))]
pub fn load_artifact(model_path: &Path, features_path: &Path) -> StartupResult<ModelArtifact> {
    let model_bytes = read_artifact(ArtifactKind::Model, model_path)?;
    let feature_bytes = read_artifact(ArtifactKind::FeatureList, features_path)?;

    let model = ForestModel::from_json_slice(&model_bytes).map_err(|e| {
        StartupFailure::CorruptArtifact {
            kind: ArtifactKind::Model,
            path: model_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let feature_names =
        parse_feature_list(&feature_bytes).map_err(|reason| StartupFailure::CorruptArtifact {
            kind: ArtifactKind::FeatureList,
            path: features_path.to_path_buf(),
            reason,
        })?;

    if feature_names.len() != model.n_features {
        warn!(
            feature_count = feature_names.len(),
            model_n_features = model.n_features,
            "feature list width differs from model width; predictions will fail"
        );
    }

    let unknown = unproduced_features(&feature_names);
    if !unknown.is_empty() {
        warn!(unproduced = ?unknown, "trained features the transform never produces");
    }

    let info = ArtifactInfo {
        model_path: model_path.to_path_buf(),
        features_path: features_path.to_path_buf(),
        model_hash: artifact_hash_hex(&model_bytes),
        model_size_bytes: model_bytes.len() as u64,
        num_trees: model.num_trees(),
        model_n_features: model.n_features,
        feature_count: feature_names.len(),
    };

    info!(
        model_hash = %info.model_hash,
        trees = info.num_trees,
        features = info.feature_count,
        "model artifact loaded"
    );

    Ok(ModelArtifact {
        model,
        feature_names,
        info,
    })
}
