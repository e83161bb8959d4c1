//! Customer attributes collected by the input form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customer country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Geography {
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Germany, Geography::Spain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Geography {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "france" => Ok(Geography::France),
            "germany" => Ok(Geography::Germany),
            "spain" => Ok(Geography::Spain),
            other => Err(format!("unknown geography: {other}")),
        }
    }
}

/// Customer gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Inclusive input ranges enforced by the form
pub mod limits {
    pub const CREDIT_SCORE: (u16, u16) = (300, 850);
    pub const AGE: (u8, u8) = (18, 100);
    pub const TENURE: (u8, u8) = (0, 10);
    pub const NUM_OF_PRODUCTS: (u8, u8) = (1, 4);
    pub const BALANCE: (f64, f64) = (0.0, 300_000.0);
    pub const ESTIMATED_SALARY: (f64, f64) = (0.0, 200_000.0);
}

/// One customer as submitted for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub credit_score: u16,
    pub geography: Geography,
    pub gender: Gender,
    pub age: u8,
    /// Years as a customer
    pub tenure: u8,
    pub balance: f64,
    pub num_of_products: u8,
    pub has_cr_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
}

impl Default for CustomerRecord {
    /// Initial values of the input form
    fn default() -> Self {
        Self {
            credit_score: 650,
            geography: Geography::France,
            gender: Gender::Male,
            age: 35,
            tenure: 5,
            balance: 75_000.0,
            num_of_products: 1,
            has_cr_card: true,
            is_active_member: true,
            estimated_salary: 60_000.0,
        }
    }
}

impl CustomerRecord {
    /// Check the form ranges.
    ///
    /// The core never calls this; it is for input paths that bypass the
    /// form widgets (JSON files, batch input).
    pub fn validate(&self) -> Result<(), String> {
        fn check<T: PartialOrd + fmt::Display>(
            name: &str,
            v: T,
            (lo, hi): (T, T),
        ) -> Result<(), String> {
            if v < lo || v > hi {
                return Err(format!("{name} {v} outside [{lo}, {hi}]"));
            }
            Ok(())
        }

        check("credit_score", self.credit_score, limits::CREDIT_SCORE)?;
        check("age", self.age, limits::AGE)?;
        check("tenure", self.tenure, limits::TENURE)?;
        check("num_of_products", self.num_of_products, limits::NUM_OF_PRODUCTS)?;
        if !self.balance.is_finite() {
            return Err("balance must be finite".to_string());
        }
        check("balance", self.balance, limits::BALANCE)?;
        if !self.estimated_salary.is_finite() {
            return Err("estimated_salary must be finite".to_string());
        }
        check("estimated_salary", self.estimated_salary, limits::ESTIMATED_SALARY)?;
        Ok(())
    }
}
