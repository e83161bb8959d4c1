//! Feature transform from customer attributes to the classifier row
//!
//! [`extract_features`] is pure and deterministic. [`align_features`]
//! reorders its output into the column order the classifier was trained
//! on, filling trained columns the transform does not produce.

use crate::customer::{CustomerRecord, Gender, Geography};
use crate::errors::{InferenceFailure, InferenceResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// Feature names as they appear in the trained feature list
pub mod names {
    pub const CREDIT_SCORE: &str = "CreditScore";
    pub const AGE: &str = "Age";
    pub const TENURE: &str = "Tenure";
    pub const BALANCE: &str = "Balance";
    pub const NUM_OF_PRODUCTS: &str = "NumOfProducts";
    pub const HAS_CR_CARD: &str = "HasCrCard";
    pub const IS_ACTIVE_MEMBER: &str = "IsActiveMember";
    pub const ESTIMATED_SALARY: &str = "EstimatedSalary";
    pub const GENDER: &str = "Gender";
    pub const GEOGRAPHY_GERMANY: &str = "Geography_Germany";
    pub const GEOGRAPHY_SPAIN: &str = "Geography_Spain";
    pub const TENURE_AGE_RATIO: &str = "TenureAgeRatio";
    pub const BALANCE_PER_PRODUCT: &str = "BalancePerProduct";
    pub const HIGH_VALUE_CUSTOMER: &str = "HighValueCustomer";
    pub const ACTIVE_SENIOR: &str = "ActiveSenior";
    pub const PRODUCT_DIVERSITY: &str = "ProductDiversity";
    pub const BALANCE_SALARY_RATIO: &str = "BalanceSalaryRatio";
    pub const CREDIT_CATEGORY_GOOD: &str = "CreditCategory_Good";
    pub const CREDIT_CATEGORY_EXCELLENT: &str = "CreditCategory_Excellent";
}

/// Order in which [`extract_features`] emits features
pub const PRODUCED_FEATURES: [&str; 19] = [
    names::CREDIT_SCORE,
    names::AGE,
    names::TENURE,
    names::BALANCE,
    names::NUM_OF_PRODUCTS,
    names::HAS_CR_CARD,
    names::IS_ACTIVE_MEMBER,
    names::ESTIMATED_SALARY,
    names::GENDER,
    names::GEOGRAPHY_GERMANY,
    names::GEOGRAPHY_SPAIN,
    names::TENURE_AGE_RATIO,
    names::BALANCE_PER_PRODUCT,
    names::HIGH_VALUE_CUSTOMER,
    names::ACTIVE_SENIOR,
    names::PRODUCT_DIVERSITY,
    names::BALANCE_SALARY_RATIO,
    names::CREDIT_CATEGORY_GOOD,
    names::CREDIT_CATEGORY_EXCELLENT,
];

/// Balance above which a customer counts as high value
pub const HIGH_VALUE_BALANCE: f64 = 100_000.0;

/// Minimum age for the active-senior flag
pub const SENIOR_AGE: u8 = 50;

/// Credit regime derived from the credit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditCategory {
    /// Below 600, the implicit baseline (both indicator flags 0)
    PoorOrFair,
    /// 600 up to but excluding 700
    Good,
    /// 700 and above
    Excellent,
}

impl CreditCategory {
    pub fn from_score(score: u16) -> Self {
        if score < 600 {
            CreditCategory::PoorOrFair
        } else if score < 700 {
            CreditCategory::Good
        } else {
            CreditCategory::Excellent
        }
    }

    /// `(CreditCategory_Good, CreditCategory_Excellent)`
    pub fn indicator_flags(&self) -> (f64, f64) {
        match self {
            CreditCategory::PoorOrFair => (0.0, 0.0),
            CreditCategory::Good => (1.0, 0.0),
            CreditCategory::Excellent => (0.0, 1.0),
        }
    }
}

/// What to do with trained features the transform does not produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Fill with 0 and carry on
    #[default]
    ZeroFill,
    /// Fail the request listing the missing names
    Strict,
}

impl FromStr for MissingFeaturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "zero_fill" | "zero" => Ok(MissingFeaturePolicy::ZeroFill),
            "strict" => Ok(MissingFeaturePolicy::Strict),
            other => Err(format!("unknown missing-feature policy: {other}")),
        }
    }
}

/// Named feature values in production order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureVector {
    entries: Vec<(&'static str, f64)>,
}

impl FeatureVector {
    pub fn from_entries(entries: Vec<(&'static str, f64)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Build the feature vector for one customer.
///
/// Raw fields come first, then the engineered ratios and flags, then the
/// two credit-category indicators. Denominators are offset so that the
/// ratio features are finite for every record in the form ranges.
pub fn extract_features(record: &CustomerRecord) -> FeatureVector {
    let age = f64::from(record.age);
    let tenure = f64::from(record.tenure);
    let products = f64::from(record.num_of_products);
    let balance = record.balance;
    let salary = record.estimated_salary;

    let tenure_age_ratio = tenure / (age + 1.0);
    let balance_per_product = balance / (products + 0.01);
    let high_value = flag(balance > HIGH_VALUE_BALANCE);
    let active_senior = flag(record.is_active_member && record.age >= SENIOR_AGE);
    let product_diversity = flag(matches!(record.num_of_products, 2 | 3));
    let balance_salary_ratio = balance / (salary + 1.0);

    let (good, excellent) = CreditCategory::from_score(record.credit_score).indicator_flags();

    FeatureVector::from_entries(vec![
        (names::CREDIT_SCORE, f64::from(record.credit_score)),
        (names::AGE, age),
        (names::TENURE, tenure),
        (names::BALANCE, balance),
        (names::NUM_OF_PRODUCTS, products),
        (names::HAS_CR_CARD, flag(record.has_cr_card)),
        (names::IS_ACTIVE_MEMBER, flag(record.is_active_member)),
        (names::ESTIMATED_SALARY, salary),
        (names::GENDER, flag(record.gender == Gender::Male)),
        (names::GEOGRAPHY_GERMANY, flag(record.geography == Geography::Germany)),
        (names::GEOGRAPHY_SPAIN, flag(record.geography == Geography::Spain)),
        (names::TENURE_AGE_RATIO, tenure_age_ratio),
        (names::BALANCE_PER_PRODUCT, balance_per_product),
        (names::HIGH_VALUE_CUSTOMER, high_value),
        (names::ACTIVE_SENIOR, active_senior),
        (names::PRODUCT_DIVERSITY, product_diversity),
        (names::BALANCE_SALARY_RATIO, balance_salary_ratio),
        (names::CREDIT_CATEGORY_GOOD, good),
        (names::CREDIT_CATEGORY_EXCELLENT, excellent),
    ])
}

/// Arrange `vector` into the trained column order.
///
/// Produced features absent from `trained` are dropped. Trained features
/// absent from `vector` are filled with 0 under
/// [`MissingFeaturePolicy::ZeroFill`] and reported under
/// [`MissingFeaturePolicy::Strict`].
pub fn align_features(
    vector: &FeatureVector,
    trained: &[String],
    policy: MissingFeaturePolicy,
) -> InferenceResult<Vec<f64>> {
    let produced: HashMap<&str, f64> = vector.iter().collect();

    let mut row = Vec::with_capacity(trained.len());
    let mut missing = Vec::new();

    for name in trained {
        match produced.get(name.as_str()) {
            Some(&value) => row.push(value),
            None => {
                missing.push(name.clone());
                row.push(0.0);
            }
        }
    }

    if !missing.is_empty() {
        match policy {
            MissingFeaturePolicy::ZeroFill => {
                debug!(missing = ?missing, "zero-filled trained features");
            }
            MissingFeaturePolicy::Strict => {
                return Err(InferenceFailure::MissingFeatures(missing));
            }
        }
    }

    Ok(row)
}

/// Trained feature names the transform never produces
pub fn unproduced_features(trained: &[String]) -> Vec<String> {
    trained
        .iter()
        .filter(|name| !PRODUCED_FEATURES.contains(&name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn produces_every_feature_in_order() {
        let vector = extract_features(&CustomerRecord::default());
        let produced: Vec<&str> = vector.names().collect();
        assert_eq!(produced, PRODUCED_FEATURES.to_vec());
    }

    #[test]
    fn encodes_categorical_fields() {
        let record = CustomerRecord {
            gender: Gender::Female,
            geography: Geography::Spain,
            has_cr_card: false,
            is_active_member: false,
            ..CustomerRecord::default()
        };
        let v = extract_features(&record);
        assert_eq!(v.get(names::GENDER), Some(0.0));
        assert_eq!(v.get(names::GEOGRAPHY_GERMANY), Some(0.0));
        assert_eq!(v.get(names::GEOGRAPHY_SPAIN), Some(1.0));
        assert_eq!(v.get(names::HAS_CR_CARD), Some(0.0));
        assert_eq!(v.get(names::IS_ACTIVE_MEMBER), Some(0.0));

        let france = extract_features(&CustomerRecord::default());
        assert_eq!(france.get(names::GEOGRAPHY_GERMANY), Some(0.0));
        assert_eq!(france.get(names::GEOGRAPHY_SPAIN), Some(0.0));
        assert_eq!(france.get(names::GENDER), Some(1.0));
    }

    #[test]
    fn engineered_flags_follow_thresholds() {
        let record = CustomerRecord {
            age: 50,
            balance: 100_000.0,
            num_of_products: 3,
            ..CustomerRecord::default()
        };
        let v = extract_features(&record);
        assert_eq!(v.get(names::ACTIVE_SENIOR), Some(1.0));
        // strictly greater than 100k
        assert_eq!(v.get(names::HIGH_VALUE_CUSTOMER), Some(0.0));
        assert_eq!(v.get(names::PRODUCT_DIVERSITY), Some(1.0));

        let record = CustomerRecord {
            age: 49,
            balance: 100_000.01,
            num_of_products: 4,
            ..CustomerRecord::default()
        };
        let v = extract_features(&record);
        assert_eq!(v.get(names::ACTIVE_SENIOR), Some(0.0));
        assert_eq!(v.get(names::HIGH_VALUE_CUSTOMER), Some(1.0));
        assert_eq!(v.get(names::PRODUCT_DIVERSITY), Some(0.0));

        for (products, diverse) in [(1, 0.0), (2, 1.0), (3, 1.0), (4, 0.0)] {
            let v = extract_features(&CustomerRecord {
                num_of_products: products,
                ..CustomerRecord::default()
            });
            assert_eq!(v.get(names::PRODUCT_DIVERSITY), Some(diverse), "{products} products");
        }

        let inactive_senior = CustomerRecord {
            age: 70,
            is_active_member: false,
            ..CustomerRecord::default()
        };
        assert_eq!(
            extract_features(&inactive_senior).get(names::ACTIVE_SENIOR),
            Some(0.0)
        );
    }

    #[test]
    fn credit_category_boundaries() {
        assert_eq!(CreditCategory::from_score(300), CreditCategory::PoorOrFair);
        assert_eq!(CreditCategory::from_score(599), CreditCategory::PoorOrFair);
        assert_eq!(CreditCategory::from_score(600), CreditCategory::Good);
        assert_eq!(CreditCategory::from_score(699), CreditCategory::Good);
        assert_eq!(CreditCategory::from_score(700), CreditCategory::Excellent);
        assert_eq!(CreditCategory::from_score(850), CreditCategory::Excellent);
    }

    #[test]
    fn zero_balance_and_salary_stay_finite() {
        let record = CustomerRecord {
            age: 18,
            tenure: 0,
            balance: 0.0,
            estimated_salary: 0.0,
            ..CustomerRecord::default()
        };
        let v = extract_features(&record);
        assert_eq!(v.get(names::TENURE_AGE_RATIO), Some(0.0));
        assert_eq!(v.get(names::BALANCE_PER_PRODUCT), Some(0.0));
        assert_eq!(v.get(names::BALANCE_SALARY_RATIO), Some(0.0));

        let record = CustomerRecord {
            balance: 300_000.0,
            estimated_salary: 0.0,
            ..CustomerRecord::default()
        };
        let ratio = extract_features(&record)
            .get(names::BALANCE_SALARY_RATIO)
            .unwrap();
        assert!(ratio.is_finite());
        assert_eq!(ratio, 300_000.0);
    }

    #[test]
    fn align_reorders_and_drops_extras() {
        let vector = extract_features(&CustomerRecord::default());
        let row = align_features(
            &vector,
            &trained(&[names::AGE, names::CREDIT_SCORE]),
            MissingFeaturePolicy::ZeroFill,
        )
        .unwrap();
        assert_eq!(row, vec![35.0, 650.0]);
    }

    #[test]
    fn align_zero_fills_missing_names() {
        let vector = FeatureVector::from_entries(vec![(names::AGE, 40.0)]);
        let row = align_features(
            &vector,
            &trained(&["Surname_Length", names::AGE, "CreditCategory_Fair"]),
            MissingFeaturePolicy::ZeroFill,
        )
        .unwrap();
        assert_eq!(row, vec![0.0, 40.0, 0.0]);
    }

    #[test]
    fn strict_policy_reports_missing_in_trained_order() {
        let vector = FeatureVector::from_entries(vec![(names::AGE, 40.0)]);
        let err = align_features(
            &vector,
            &trained(&["Zeta", names::AGE, "Alpha"]),
            MissingFeaturePolicy::Strict,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InferenceFailure::MissingFeatures(vec!["Zeta".into(), "Alpha".into()])
        );
    }

    #[test]
    fn unproduced_lists_unknown_trained_names() {
        let list = trained(&[names::AGE, "RowNumber", names::GENDER, "Surname"]);
        assert_eq!(unproduced_features(&list), vec!["RowNumber", "Surname"]);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "zero_fill".parse::<MissingFeaturePolicy>().unwrap(),
            MissingFeaturePolicy::ZeroFill
        );
        assert_eq!(
            "Zero-Fill".parse::<MissingFeaturePolicy>().unwrap(),
            MissingFeaturePolicy::ZeroFill
        );
        assert_eq!(
            "STRICT".parse::<MissingFeaturePolicy>().unwrap(),
            MissingFeaturePolicy::Strict
        );
        assert!("lenient".parse::<MissingFeaturePolicy>().is_err());
    }
}
