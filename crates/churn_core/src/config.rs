//! Configuration loading
//!
//! Defaults, then an optional TOML file, then environment overrides.
//! Command-line flags are applied by the caller on top.

use crate::errors::{StartupFailure, StartupResult};
use crate::features::MissingFeaturePolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File consulted when no path is given and `CHURN_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/churn.toml";

pub const ENV_CONFIG: &str = "CHURN_CONFIG";
pub const ENV_MODEL_PATH: &str = "CHURN_MODEL_PATH";
pub const ENV_FEATURES_PATH: &str = "CHURN_FEATURES_PATH";
pub const ENV_MISSING_FEATURE_POLICY: &str = "CHURN_MISSING_FEATURE_POLICY";
pub const ENV_LOG_LEVEL: &str = "CHURN_LOG_LEVEL";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    pub artifacts: ArtifactConfig,
    pub features: FeatureConfig,
    pub logging: LoggingConfig,
}

/// Locations of the two startup artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub features_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("customer_churn_rf_model.json"),
            features_path: PathBuf::from("model_features.json"),
        }
    }
}

/// Feature alignment behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub missing_policy: MissingFeaturePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ChurnConfig {
    /// Resolve and load configuration.
    ///
    /// An explicit `path` must exist. Without one, `CHURN_CONFIG` is used
    /// if set, else [`DEFAULT_CONFIG_PATH`] if present, else defaults.
    pub fn load(path: Option<&Path>) -> StartupResult<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match explicit {
            Some(p) => Self::from_file(&p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                debug!("no configuration file; using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> StartupResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StartupFailure::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| {
            StartupFailure::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> StartupResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty(ENV_MODEL_PATH) {
            self.artifacts.model_path = PathBuf::from(path.trim());
        }
        if let Some(path) = non_empty(ENV_FEATURES_PATH) {
            self.artifacts.features_path = PathBuf::from(path.trim());
        }
        if let Some(policy) = non_empty(ENV_MISSING_FEATURE_POLICY) {
            self.features.missing_policy = policy.parse().map_err(|e: String| {
                StartupFailure::Config(format!("{ENV_MISSING_FEATURE_POLICY}: {e}"))
            })?;
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_string();
        }
        Ok(())
    }
}
