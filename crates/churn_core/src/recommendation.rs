//! Retention copy per risk tier and rule-based risk factors

use crate::customer::{CustomerRecord, Geography};
use crate::risk::RiskTier;
use serde::Serialize;

/// A numbered retention step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Action {
    pub title: &'static str,
    pub detail: &'static str,
}

/// Static retention playbook for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub tier: RiskTier,
    pub headline: &'static str,
    pub horizon: &'static str,
    pub actions: [Action; 5],
    pub footnote: &'static str,
}

const fn action(title: &'static str, detail: &'static str) -> Action {
    Action { title, detail }
}

static URGENT: Recommendation = Recommendation {
    tier: RiskTier::High,
    headline: "URGENT ACTION REQUIRED",
    horizon: "Immediate Steps (Within 24-48 hours)",
    actions: [
        action("Personal Call", "Assign relationship manager for immediate contact"),
        action(
            "Premium Retention Offer",
            "Waive fees, increase interest rates, or loyalty bonus",
        ),
        action(
            "Executive Escalation",
            "Involve senior management for high-value customer",
        ),
        action("Follow-up Email", "Personalized message with exclusive offers"),
        action("Root Cause Analysis", "Investigate specific pain points"),
    ],
    footnote: "Estimated Customer Lifetime Value at Risk: $35,000 - $75,000",
};

static PROACTIVE: Recommendation = Recommendation {
    tier: RiskTier::Medium,
    headline: "PROACTIVE ENGAGEMENT RECOMMENDED",
    horizon: "Next Steps (Within 1-2 weeks)",
    actions: [
        action("Personalized Email", "Highlight benefits they're not using"),
        action(
            "Product Cross-sell",
            "Suggest additional products that add value",
        ),
        action("App Engagement", "Encourage mobile banking adoption"),
        action("Courtesy Call", "Check satisfaction and address concerns"),
        action(
            "Targeted Campaign",
            "Include in next loyalty program promotion",
        ),
    ],
    footnote: "Estimated Intervention Cost: $100 - $300",
};

static STANDARD: Recommendation = Recommendation {
    tier: RiskTier::Low,
    headline: "STANDARD ENGAGEMENT",
    horizon: "Ongoing Actions",
    actions: [
        action("Regular Communication", "Newsletter and product updates"),
        action("Loyalty Rewards", "Recognition for continued partnership"),
        action("Feedback Survey", "Annual satisfaction check"),
        action("Quarterly Check-in", "Maintain relationship"),
        action("VIP Treatment", "Priority customer service"),
    ],
    footnote: "Status: Low risk, maintain current engagement level",
};

impl Recommendation {
    pub fn for_tier(tier: RiskTier) -> &'static Recommendation {
        match tier {
            RiskTier::High => &URGENT,
            RiskTier::Medium => &PROACTIVE,
            RiskTier::Low => &STANDARD,
        }
    }
}

/// Shown when no risk-factor rule fires
pub const NO_RISK_FACTORS: &str = "No significant risk factors identified";

/// Observable attribute correlated with churn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    AgeAbove45,
    Germany,
    ManyProducts,
    Inactive,
    ZeroBalance,
    NewCustomer,
}

impl RiskFactor {
    /// Rule evaluation order
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::AgeAbove45,
        RiskFactor::Germany,
        RiskFactor::ManyProducts,
        RiskFactor::Inactive,
        RiskFactor::ZeroBalance,
        RiskFactor::NewCustomer,
    ];

    pub fn applies_to(&self, record: &CustomerRecord) -> bool {
        match self {
            RiskFactor::AgeAbove45 => record.age > 45,
            RiskFactor::Germany => record.geography == Geography::Germany,
            RiskFactor::ManyProducts => record.num_of_products >= 3,
            RiskFactor::Inactive => !record.is_active_member,
            RiskFactor::ZeroBalance => record.balance == 0.0,
            RiskFactor::NewCustomer => record.tenure < 2,
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            RiskFactor::AgeAbove45 => "Age above 45 (higher churn correlation)",
            RiskFactor::Germany => "Located in Germany (highest churn region)",
            RiskFactor::ManyProducts => "Has 3+ products (potential over-complexity)",
            RiskFactor::Inactive => "Inactive member (low engagement)",
            RiskFactor::ZeroBalance => "Zero balance (account not utilized)",
            RiskFactor::NewCustomer => "New customer (< 2 years tenure)",
        }
    }
}

/// Every rule that fires for `record`, in rule order
pub fn risk_factors(record: &CustomerRecord) -> Vec<RiskFactor> {
    RiskFactor::ALL
        .into_iter()
        .filter(|factor| factor.applies_to(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_tier_has_its_own_playbook() {
        for tier in RiskTier::ALL {
            assert_eq!(Recommendation::for_tier(tier).tier, tier);
        }
        assert_eq!(
            Recommendation::for_tier(RiskTier::High).headline,
            "URGENT ACTION REQUIRED"
        );
        assert_eq!(
            Recommendation::for_tier(RiskTier::Medium).actions[1].title,
            "Product Cross-sell"
        );
        assert_eq!(
            Recommendation::for_tier(RiskTier::Low).footnote,
            "Status: Low risk, maintain current engagement level"
        );
    }

    #[test]
    fn high_risk_profile_fires_four_rules() {
        let record = CustomerRecord {
            age: 55,
            geography: Geography::Germany,
            num_of_products: 4,
            is_active_member: false,
            tenure: 10,
            ..CustomerRecord::default()
        };
        assert_eq!(
            risk_factors(&record),
            vec![
                RiskFactor::AgeAbove45,
                RiskFactor::Germany,
                RiskFactor::ManyProducts,
                RiskFactor::Inactive,
            ]
        );
    }

    #[test]
    fn default_customer_has_no_factors() {
        assert!(risk_factors(&CustomerRecord::default()).is_empty());
    }

    #[test]
    fn zero_balance_and_new_customer_rules() {
        let record = CustomerRecord {
            balance: 0.0,
            tenure: 1,
            ..CustomerRecord::default()
        };
        assert_eq!(
            risk_factors(&record),
            vec![RiskFactor::ZeroBalance, RiskFactor::NewCustomer]
        );

        // boundaries: age 45 and tenure 2 do not fire
        let record = CustomerRecord {
            age: 45,
            tenure: 2,
            num_of_products: 2,
            ..CustomerRecord::default()
        };
        assert!(risk_factors(&record).is_empty());
    }
}
