//! Risk classifier adapter and the process-wide instance
//!
//! The adapter owns the classifier and the trained column order. One
//! instance is installed at startup with [`install`] and never replaced.

use crate::artifact::{ArtifactInfo, ModelArtifact};
use crate::classifier::ChurnClassifier;
use crate::customer::CustomerRecord;
use crate::errors::{InferenceFailure, InferenceResult, StartupFailure, StartupResult};
use crate::features::{align_features, extract_features, FeatureVector, MissingFeaturePolicy};
use crate::recommendation::{risk_factors, Recommendation};
use crate::report::{Assessment, ProfileSummary};
use crate::risk::{Gauge, PredictionResult};
use once_cell::sync::OnceCell;
use tracing::{debug, instrument};

/// Slack allowed when checking that class probabilities sum to one
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Wraps an opaque classifier behind feature alignment and risk tiering
pub struct RiskClassifierAdapter {
    classifier: Box<dyn ChurnClassifier>,
    feature_names: Vec<String>,
    policy: MissingFeaturePolicy,
    info: Option<ArtifactInfo>,
}

impl RiskClassifierAdapter {
    pub fn new<C>(classifier: C, feature_names: Vec<String>, policy: MissingFeaturePolicy) -> Self
    where
        C: ChurnClassifier + 'static,
    {
        Self {
            classifier: Box::new(classifier),
            feature_names,
            policy,
            info: None,
        }
    }

    pub fn from_artifact(artifact: ModelArtifact, policy: MissingFeaturePolicy) -> Self {
        Self {
            classifier: Box::new(artifact.model),
            feature_names: artifact.feature_names,
            policy,
            info: Some(artifact.info),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn policy(&self) -> MissingFeaturePolicy {
        self.policy
    }

    /// Present when built from a loaded artifact
    pub fn info(&self) -> Option<&ArtifactInfo> {
        self.info.as_ref()
    }

    /// Align `vector` to the trained columns and run the classifier
    pub fn classify(&self, vector: &FeatureVector) -> InferenceResult<PredictionResult> {
        let row = align_features(vector, &self.feature_names, self.policy)?;

        let expected = self.classifier.n_features();
        if row.len() != expected {
            return Err(InferenceFailure::FeatureCountMismatch {
                expected,
                actual: row.len(),
            });
        }

        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(InferenceFailure::NonFiniteFeature {
                name: self.feature_names[i].clone(),
            });
        }

        let predicted_class = self.classifier.predict_class(&row)?;
        let probabilities = self.classifier.predict_probabilities(&row)?;
        check_probabilities(probabilities)?;

        let result = PredictionResult::new(predicted_class, probabilities);
        debug!(
            churn_probability = result.churn_probability,
            tier = ?result.tier,
            "classified"
        );
        Ok(result)
    }

    /// Full request: transform, classify, then attach recommendation,
    /// risk factors and profile summary
    #[instrument(skip_all)]
    pub fn assess(&self, record: &CustomerRecord) -> InferenceResult<Assessment> {
        let features = extract_features(record);
        let prediction = self.classify(&features)?;

        Ok(Assessment {
            record: record.clone(),
            recommendation: Recommendation::for_tier(prediction.tier),
            risk_factors: risk_factors(record),
            profile: ProfileSummary::from_record(record),
            gauge: Gauge::for_percent(prediction.churn_percent()),
            features,
            prediction,
        })
    }
}

fn check_probabilities([stay, churn]: [f64; 2]) -> InferenceResult<()> {
    let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
    if !in_unit(stay) || !in_unit(churn) {
        return Err(InferenceFailure::InvalidProbabilities(format!(
            "[{stay}, {churn}] outside [0, 1]"
        )));
    }
    if ((stay + churn) - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InferenceFailure::InvalidProbabilities(format!(
            "[{stay}, {churn}] does not sum to 1"
        )));
    }
    Ok(())
}

static GLOBAL: OnceCell<RiskClassifierAdapter> = OnceCell::new();

/// Install the process-wide adapter. Fails if one is already installed.
pub fn install(adapter: RiskClassifierAdapter) -> StartupResult<&'static RiskClassifierAdapter> {
    GLOBAL
        .try_insert(adapter)
        .map_err(|_| StartupFailure::AlreadyInitialized)
}

/// The installed adapter, or [`InferenceFailure::NotInitialized`]
pub fn global() -> InferenceResult<&'static RiskClassifierAdapter> {
    GLOBAL.get().ok_or(InferenceFailure::NotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{names, PRODUCED_FEATURES};
    use crate::risk::RiskTier;

    /// Returns fixed probabilities regardless of input
    struct FixedClassifier {
        width: usize,
        probabilities: [f64; 2],
    }

    impl ChurnClassifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.width
        }

        fn predict_class(&self, _features: &[f64]) -> InferenceResult<u8> {
            Ok(u8::from(self.probabilities[1] > self.probabilities[0]))
        }

        fn predict_probabilities(&self, _features: &[f64]) -> InferenceResult<[f64; 2]> {
            Ok(self.probabilities)
        }
    }

    fn all_features() -> Vec<String> {
        PRODUCED_FEATURES.iter().map(|s| s.to_string()).collect()
    }

    fn adapter(probabilities: [f64; 2]) -> RiskClassifierAdapter {
        RiskClassifierAdapter::new(
            FixedClassifier {
                width: PRODUCED_FEATURES.len(),
                probabilities,
            },
            all_features(),
            MissingFeaturePolicy::ZeroFill,
        )
    }

    #[test]
    fn seventy_percent_is_high_tier() {
        let result = adapter([0.3, 0.7])
            .classify(&extract_features(&CustomerRecord::default()))
            .unwrap();
        assert_eq!(result.tier, RiskTier::High);
        assert_eq!(result.predicted_class, 1);
        assert_eq!(result.stay_probability, 0.3);
    }

    #[test]
    fn assess_bundles_recommendation_for_tier() {
        let assessment = adapter([0.55, 0.45])
            .assess(&CustomerRecord::default())
            .unwrap();
        assert_eq!(assessment.prediction.tier, RiskTier::Medium);
        assert_eq!(assessment.recommendation.tier, RiskTier::Medium);
        assert!(assessment.risk_factors.is_empty());
        assert_eq!(assessment.gauge.value, assessment.prediction.churn_percent());
    }

    #[test]
    fn width_mismatch_is_an_inference_failure() {
        let adapter = RiskClassifierAdapter::new(
            FixedClassifier {
                width: 3,
                probabilities: [0.5, 0.5],
            },
            all_features(),
            MissingFeaturePolicy::ZeroFill,
        );
        let err = adapter
            .classify(&extract_features(&CustomerRecord::default()))
            .unwrap_err();
        assert_eq!(
            err,
            InferenceFailure::FeatureCountMismatch {
                expected: 3,
                actual: 19
            }
        );
    }

    #[test]
    fn non_finite_feature_is_named() {
        let vector = FeatureVector::from_entries(vec![(names::AGE, f64::NAN)]);
        let adapter = RiskClassifierAdapter::new(
            FixedClassifier {
                width: 1,
                probabilities: [0.5, 0.5],
            },
            vec![names::AGE.to_string()],
            MissingFeaturePolicy::ZeroFill,
        );
        assert_eq!(
            adapter.classify(&vector).unwrap_err(),
            InferenceFailure::NonFiniteFeature {
                name: names::AGE.to_string()
            }
        );
    }

    #[test]
    fn rejects_malformed_probabilities() {
        let vector = extract_features(&CustomerRecord::default());
        assert!(matches!(
            adapter([0.7, 0.7]).classify(&vector),
            Err(InferenceFailure::InvalidProbabilities(_))
        ));
        assert!(matches!(
            adapter([-0.1, 1.1]).classify(&vector),
            Err(InferenceFailure::InvalidProbabilities(_))
        ));
    }

    #[test]
    fn strict_policy_fails_on_unknown_trained_name() {
        let mut names = all_features();
        names.push("Complain".to_string());
        let adapter = RiskClassifierAdapter::new(
            FixedClassifier {
                width: names.len(),
                probabilities: [0.9, 0.1],
            },
            names,
            MissingFeaturePolicy::Strict,
        );
        assert_eq!(
            adapter.assess(&CustomerRecord::default()).unwrap_err(),
            InferenceFailure::MissingFeatures(vec!["Complain".to_string()])
        );
    }

    #[test]
    fn zero_fill_policy_serves_unknown_trained_name() {
        let mut names = all_features();
        names.push("Complain".to_string());
        let adapter = RiskClassifierAdapter::new(
            FixedClassifier {
                width: names.len(),
                probabilities: [0.9, 0.1],
            },
            names,
            MissingFeaturePolicy::ZeroFill,
        );
        let result = adapter.assess(&CustomerRecord::default()).unwrap();
        assert_eq!(result.prediction.tier, RiskTier::Low);
    }
}
