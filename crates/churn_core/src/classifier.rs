//! Capability interface for the pre-trained classifier
//!
//! The rest of the crate only sees this trait; [`crate::forest::ForestModel`]
//! is one implementation.

use crate::errors::InferenceResult;

/// Class index of customers who stayed
pub const STAY_CLASS: u8 = 0;

/// Class index of customers who churned
pub const CHURN_CLASS: u8 = 1;

/// A binary classifier over aligned feature rows
pub trait ChurnClassifier: Send + Sync {
    /// Row width the classifier accepts
    fn n_features(&self) -> usize;

    /// Predicted label, [`STAY_CLASS`] or [`CHURN_CLASS`]
    fn predict_class(&self, features: &[f64]) -> InferenceResult<u8>;

    /// `[p_stay, p_churn]`
    fn predict_probabilities(&self, features: &[f64]) -> InferenceResult<[f64; 2]>;
}
