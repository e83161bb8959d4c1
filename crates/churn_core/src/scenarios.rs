//! Sample customer profiles for trying the system out

use crate::customer::{CustomerRecord, Geography};
use crate::risk::RiskTier;
use serde::Serialize;

/// A named preset with the tier it is meant to illustrate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleScenario {
    pub name: &'static str,
    pub illustrates: RiskTier,
    pub record: CustomerRecord,
}

/// High, medium and low risk presets; unlisted fields keep form defaults
pub fn sample_scenarios() -> Vec<SampleScenario> {
    vec![
        SampleScenario {
            name: "High Risk Customer",
            illustrates: RiskTier::High,
            record: CustomerRecord {
                age: 55,
                geography: Geography::Germany,
                num_of_products: 4,
                is_active_member: false,
                tenure: 10,
                ..CustomerRecord::default()
            },
        },
        SampleScenario {
            name: "Medium Risk Customer",
            illustrates: RiskTier::Medium,
            record: CustomerRecord {
                age: 42,
                geography: Geography::Spain,
                num_of_products: 2,
                is_active_member: true,
                tenure: 5,
                ..CustomerRecord::default()
            },
        },
        SampleScenario {
            name: "Low Risk Customer",
            illustrates: RiskTier::Low,
            record: CustomerRecord {
                age: 30,
                geography: Geography::France,
                num_of_products: 2,
                is_active_member: true,
                tenure: 8,
                ..CustomerRecord::default()
            },
        },
    ]
}
