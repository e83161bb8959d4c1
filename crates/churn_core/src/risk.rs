//! Churn-probability thresholds and prediction results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Churn percentage at or above which a customer is high risk
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Churn percentage at or above which a customer is at least medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

/// Three-way risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Tier for a churn percentage in [0, 100]; lower bounds are inclusive
    pub fn from_churn_percent(percent: f64) -> Self {
        if percent >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if percent >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn from_churn_probability(probability: f64) -> Self {
        Self::from_churn_percent(probability * 100.0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::High => "HIGH RISK",
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            RiskTier::Low => "🟢",
            RiskTier::Medium => "🟡",
            RiskTier::High => "🔴",
        }
    }

    /// Percentage interval `[lo, hi)` covered by the tier (High is closed at 100)
    pub fn percent_range(&self) -> (f64, f64) {
        match self {
            RiskTier::Low => (0.0, MEDIUM_RISK_THRESHOLD),
            RiskTier::Medium => (MEDIUM_RISK_THRESHOLD, HIGH_RISK_THRESHOLD),
            RiskTier::High => (HIGH_RISK_THRESHOLD, 100.0),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one successful classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Label returned by the classifier
    pub predicted_class: u8,
    /// Probability of the churn class, in [0, 1]
    pub churn_probability: f64,
    /// Probability of the stay class, in [0, 1]
    pub stay_probability: f64,
    pub tier: RiskTier,
}

impl PredictionResult {
    pub fn new(predicted_class: u8, [stay, churn]: [f64; 2]) -> Self {
        Self {
            predicted_class,
            churn_probability: churn,
            stay_probability: stay,
            tier: RiskTier::from_churn_probability(churn),
        }
    }

    pub fn churn_percent(&self) -> f64 {
        self.churn_probability * 100.0
    }

    pub fn stay_percent(&self) -> f64 {
        self.stay_probability * 100.0
    }
}

/// Reference value the gauge delta is measured against
pub const GAUGE_REFERENCE: f64 = 50.0;

/// Data for a 0-100 churn gauge with the tier bands marked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub value: f64,
    /// Signed distance from [`GAUGE_REFERENCE`]
    pub delta: f64,
    pub threshold: f64,
    pub bands: [(RiskTier, f64, f64); 3],
}

impl Gauge {
    pub fn for_percent(value: f64) -> Self {
        let band = |tier: RiskTier| {
            let (lo, hi) = tier.percent_range();
            (tier, lo, hi)
        };
        Self {
            value,
            delta: value - GAUGE_REFERENCE,
            threshold: HIGH_RISK_THRESHOLD,
            bands: [band(RiskTier::Low), band(RiskTier::Medium), band(RiskTier::High)],
        }
    }

    /// Tier whose band contains the gauge value
    pub fn active_band(&self) -> RiskTier {
        RiskTier::from_churn_percent(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_on_the_high_side() {
        assert_eq!(RiskTier::from_churn_percent(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_churn_percent(39.999), RiskTier::Low);
        assert_eq!(RiskTier::from_churn_percent(40.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_churn_percent(69.999), RiskTier::Medium);
        assert_eq!(RiskTier::from_churn_percent(70.0), RiskTier::High);
        assert_eq!(RiskTier::from_churn_percent(100.0), RiskTier::High);
    }

    #[test]
    fn probability_seventy_percent_is_high() {
        let result = PredictionResult::new(1, [0.3, 0.7]);
        assert_eq!(result.tier, RiskTier::High);
        assert!((result.churn_percent() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn bands_are_contiguous() {
        let gauge = Gauge::for_percent(55.0);
        assert_eq!(gauge.bands[0].1, 0.0);
        assert_eq!(gauge.bands[0].2, gauge.bands[1].1);
        assert_eq!(gauge.bands[1].2, gauge.bands[2].1);
        assert_eq!(gauge.bands[2].2, 100.0);
        assert_eq!(gauge.active_band(), RiskTier::Medium);
        assert_eq!(gauge.delta, 5.0);
        assert_eq!(gauge.threshold, 70.0);
    }

    #[test]
    fn labels_and_serialization() {
        assert_eq!(RiskTier::High.to_string(), "HIGH RISK");
        assert_eq!(RiskTier::Low.indicator(), "🟢");
        assert_eq!(serde_json::to_string(&RiskTier::Medium).unwrap(), "\"MEDIUM\"");
    }
}
