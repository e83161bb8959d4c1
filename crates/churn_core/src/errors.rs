//! Error types for the churn core
//!
//! Two kinds only: [`StartupFailure`] is fatal and happens before any
//! request is served, [`InferenceFailure`] is scoped to one request.

use std::path::PathBuf;
use thiserror::Error;

/// Which of the two startup artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Serialized classifier
    Model,
    /// Ordered feature-name list the classifier was trained on
    FeatureList,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Model => f.write_str("model"),
            ArtifactKind::FeatureList => f.write_str("feature list"),
        }
    }
}

/// Errors that prevent the system from serving predictions at all
#[derive(Error, Debug)]
pub enum StartupFailure {
    /// Artifact file does not exist or cannot be opened
    #[error("{kind} artifact not found at {}: {source}", path.display())]
    MissingArtifact {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact file exists but does not decode or validate
    #[error("{kind} artifact at {} is corrupt: {reason}", path.display())]
    CorruptArtifact {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    /// Configuration file unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The process-wide artifact was already installed
    #[error("Model artifact already initialized")]
    AlreadyInitialized,
}

/// Errors scoped to a single prediction request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceFailure {
    /// Aligned row does not match the width the classifier expects
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// Trained features the transform did not produce (strict policy only)
    #[error("Missing features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    /// NaN or infinite value in the input row
    #[error("Non-finite value for feature {name}")]
    NonFiniteFeature { name: String },

    /// Tree traversal hit an invalid node
    #[error("Malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    /// Classifier returned probabilities outside [0, 1] or not summing to 1
    #[error("Invalid class probabilities: {0}")]
    InvalidProbabilities(String),

    /// No artifact has been installed yet
    #[error("Model artifact not initialized")]
    NotInitialized,
}

/// Result type for startup operations
pub type StartupResult<T> = std::result::Result<T, StartupFailure>;

/// Result type for per-request operations
pub type InferenceResult<T> = std::result::Result<T, InferenceFailure>;
