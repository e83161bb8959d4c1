//! Customer churn early warning core
//!
//! Turns a submitted customer record into a churn probability, a risk
//! tier and retention guidance, using a pre-trained classifier loaded from
//! disk once at startup.
//!
//! Modules:
//! - `customer`: Input record and its form ranges
//! - `features`: Feature transform and alignment to the trained columns
//! - `classifier`: Capability interface for the pre-trained model
//! - `forest`: Tree-ensemble implementation of that interface
//! - `artifact`: Loading and validating the model and feature list
//! - `adapter`: Risk classifier adapter and the process-wide instance
//! - `risk`: Tier thresholds, prediction results, gauge data
//! - `recommendation`: Retention copy and risk-factor rules
//! - `report`: Assessment output and text rendering
//! - `scenarios`: Sample customer presets
//! - `config`: Configuration loading
//! - `errors`: Startup and inference error types

pub mod adapter;
pub mod artifact;
pub mod classifier;
pub mod config;
pub mod customer;
pub mod errors;
pub mod features;
pub mod forest;
pub mod recommendation;
pub mod report;
pub mod risk;
pub mod scenarios;

pub use adapter::RiskClassifierAdapter;
pub use artifact::{load_artifact, ArtifactInfo, ModelArtifact};
pub use classifier::ChurnClassifier;
pub use config::ChurnConfig;
pub use customer::{CustomerRecord, Gender, Geography};
pub use errors::{ArtifactKind, InferenceFailure, StartupFailure};
pub use features::{
    align_features, extract_features, CreditCategory, FeatureVector, MissingFeaturePolicy,
};
pub use forest::ForestModel;
pub use recommendation::{risk_factors, Recommendation, RiskFactor};
pub use report::{render_text, Assessment, ProfileSummary};
pub use risk::{Gauge, PredictionResult, RiskTier};
pub use scenarios::{sample_scenarios, SampleScenario};

/// Crate version string for startup reporting
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load artifacts per `config` and install the process-wide adapter.
///
/// Must run once, before any request is served.
pub fn initialize(config: &ChurnConfig) -> errors::StartupResult<&'static RiskClassifierAdapter> {
    let artifact = load_artifact(
        &config.artifacts.model_path,
        &config.artifacts.features_path,
    )?;
    adapter::install(RiskClassifierAdapter::from_artifact(
        artifact,
        config.features.missing_policy,
    ))
}
