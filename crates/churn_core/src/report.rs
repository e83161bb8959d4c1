//! Assessment output and its plain-text rendering

use crate::customer::{CustomerRecord, Gender, Geography};
use crate::features::FeatureVector;
use crate::recommendation::{Recommendation, RiskFactor, NO_RISK_FACTORS};
use crate::risk::{Gauge, PredictionResult, RiskTier};
use serde::Serialize;
use std::fmt::Write as _;

/// Everything produced for one customer
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub record: CustomerRecord,
    pub features: FeatureVector,
    pub prediction: PredictionResult,
    pub recommendation: &'static Recommendation,
    pub risk_factors: Vec<RiskFactor>,
    pub profile: ProfileSummary,
    pub gauge: Gauge,
}

/// Customer facts shown next to the prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub age: u8,
    pub gender: Gender,
    pub geography: Geography,
    pub credit_score: u16,
    pub tenure: u8,
    pub is_active_member: bool,
    pub balance: f64,
    pub estimated_salary: f64,
    pub num_of_products: u8,
    pub has_cr_card: bool,
    /// Plain `balance / num_of_products`, unlike the model feature
    pub balance_per_product: f64,
    pub tenure_age_ratio: f64,
}

impl ProfileSummary {
    pub fn from_record(record: &CustomerRecord) -> Self {
        Self {
            age: record.age,
            gender: record.gender,
            geography: record.geography,
            credit_score: record.credit_score,
            tenure: record.tenure,
            is_active_member: record.is_active_member,
            balance: record.balance,
            estimated_salary: record.estimated_salary,
            num_of_products: record.num_of_products,
            has_cr_card: record.has_cr_card,
            balance_per_product: record.balance / f64::from(record.num_of_products.max(1)),
            tenure_age_ratio: f64::from(record.tenure) / (f64::from(record.age) + 1.0),
        }
    }
}

/// Format as dollars with thousands separators, e.g. `$75,000.00`
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

const GAUGE_WIDTH: usize = 50;

/// One-line bar, `#` up to the value, with `|` at band edges
pub fn render_gauge(gauge: &Gauge) -> String {
    let filled = ((gauge.value.clamp(0.0, 100.0) / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let edges: Vec<usize> = gauge
        .bands
        .iter()
        .skip(1)
        .map(|(_, lo, _)| ((lo / 100.0) * GAUGE_WIDTH as f64).round() as usize)
        .collect();

    let mut bar = String::with_capacity(GAUGE_WIDTH + 8);
    bar.push('[');
    for i in 0..GAUGE_WIDTH {
        if edges.contains(&i) {
            bar.push('|');
        }
        bar.push(if i < filled { '#' } else { '.' });
    }
    bar.push(']');
    let sign = if gauge.delta >= 0.0 { "+" } else { "" };
    format!(
        "{bar} {:.1}% ({sign}{:.1} vs {:.0})",
        gauge.value,
        gauge.delta,
        gauge.value - gauge.delta
    )
}

/// Plain-text report for a terminal
pub fn render_text(assessment: &Assessment) -> String {
    let p = &assessment.prediction;
    let tier: RiskTier = p.tier;
    let rec = assessment.recommendation;
    let profile = &assessment.profile;

    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "{} {}", tier.indicator(), tier.label());
    let _ = writeln!(out, "Churn Probability: {:.1}%", p.churn_percent());
    let _ = writeln!(out, "{}", render_gauge(&assessment.gauge));
    let _ = writeln!(out);

    let _ = writeln!(out, "Detailed Analysis");
    let _ = writeln!(out, "  Stay Probability:  {:.1}%", p.stay_percent());
    let _ = writeln!(out, "  Churn Probability: {:.1}%", p.churn_percent());
    let _ = writeln!(out, "  Risk Category:     {}", tier.label());
    let _ = writeln!(out);

    let _ = writeln!(out, "Recommended Actions: {}", rec.headline);
    let _ = writeln!(out, "  {}:", rec.horizon);
    for (i, action) in rec.actions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} - {}", i + 1, action.title, action.detail);
    }
    let _ = writeln!(out, "  {}", rec.footnote);
    let _ = writeln!(out);

    let _ = writeln!(out, "Customer Profile Summary");
    let _ = writeln!(out, "  Age: {} years", profile.age);
    let _ = writeln!(out, "  Gender: {}", profile.gender);
    let _ = writeln!(out, "  Location: {}", profile.geography);
    let _ = writeln!(out, "  Credit Score: {}", profile.credit_score);
    let _ = writeln!(out, "  Tenure: {} years", profile.tenure);
    let _ = writeln!(out, "  Active Member: {}", yes_no(profile.is_active_member));
    let _ = writeln!(out, "  Balance: {}", format_money(profile.balance));
    let _ = writeln!(out, "  Estimated Salary: {}", format_money(profile.estimated_salary));
    let _ = writeln!(out, "  Number of Products: {}", profile.num_of_products);
    let _ = writeln!(out, "  Has Credit Card: {}", yes_no(profile.has_cr_card));
    let _ = writeln!(
        out,
        "  Balance per Product: {}",
        format_money(profile.balance_per_product)
    );
    let _ = writeln!(out, "  Tenure/Age Ratio: {:.3}", profile.tenure_age_ratio);
    let _ = writeln!(out);

    let _ = writeln!(out, "Key Risk Factors");
    if assessment.risk_factors.is_empty() {
        let _ = writeln!(out, "  {NO_RISK_FACTORS}");
    } else {
        for factor in &assessment.risk_factors {
            let _ = writeln!(out, "  • {}", factor.explanation());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::recommendation::risk_factors;

    fn assessment(record: CustomerRecord, probabilities: [f64; 2]) -> Assessment {
        let prediction = PredictionResult::new(u8::from(probabilities[1] > 0.5), probabilities);
        Assessment {
            features: extract_features(&record),
            recommendation: Recommendation::for_tier(prediction.tier),
            risk_factors: risk_factors(&record),
            profile: ProfileSummary::from_record(&record),
            gauge: Gauge::for_percent(prediction.churn_percent()),
            prediction,
            record,
        }
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(75_000.0), "$75,000.00");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(1_234_567.5), "$1,234,567.50");
        assert_eq!(format_money(-12.3), "-$12.30");
    }

    #[test]
    fn profile_uses_plain_balance_per_product() {
        let record = CustomerRecord {
            balance: 90_000.0,
            num_of_products: 3,
            tenure: 5,
            age: 35,
            ..CustomerRecord::default()
        };
        let profile = ProfileSummary::from_record(&record);
        assert_eq!(profile.balance_per_product, 30_000.0);
        assert!((profile.tenure_age_ratio - 5.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn text_report_sections() {
        let text = render_text(&assessment(CustomerRecord::default(), [0.85, 0.15]));
        assert!(text.starts_with("🟢 LOW RISK"));
        assert!(text.contains("Churn Probability: 15.0%"));
        assert!(text.contains("Stay Probability:  85.0%"));
        assert!(text.contains("STANDARD ENGAGEMENT"));
        assert!(text.contains("Balance: $75,000.00"));
        assert!(text.contains("Tenure/Age Ratio: 0.139"));
        assert!(text.contains(NO_RISK_FACTORS));
    }

    #[test]
    fn text_report_lists_factors() {
        let record = CustomerRecord {
            age: 55,
            geography: Geography::Germany,
            is_active_member: false,
            ..CustomerRecord::default()
        };
        let text = render_text(&assessment(record, [0.2, 0.8]));
        assert!(text.starts_with("🔴 HIGH RISK"));
        assert!(text.contains("URGENT ACTION REQUIRED"));
        assert!(text.contains("• Age above 45"));
        assert!(text.contains("• Located in Germany"));
        assert!(text.contains("• Inactive member"));
        assert!(!text.contains(NO_RISK_FACTORS));
    }

    #[test]
    fn gauge_bar_marks_value_and_delta() {
        let bar = render_gauge(&Gauge::for_percent(70.0));
        assert!(bar.ends_with("70.0% (+20.0 vs 50)"));
        assert_eq!(bar.matches('|').count(), 2);
        assert_eq!(bar.matches('#').count(), 35);

        let bar = render_gauge(&Gauge::for_percent(10.0));
        assert!(bar.ends_with("10.0% (-40.0 vs 50)"));
    }
}
