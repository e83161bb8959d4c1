//! Tree-ensemble churn classifier
//!
//! The artifact format is plain JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "n_features": 19,
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"feature_idx":1,"threshold":42.5,"left":1,"right":2,"value":null},
//!         {"id":1,"feature_idx":-1,"threshold":0.0,"left":-1,"right":-1,"value":[80.0,20.0]},
//!         {"id":2,"feature_idx":-1,"threshold":0.0,"left":-1,"right":-1,"value":[30.0,70.0]}
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Split nodes send a row left when `row[feature_idx] <= threshold`.
//! Leaves hold `[stay, churn]` weights (sample counts or fractions),
//! normalized per tree and averaged across the ensemble.

pub mod model;
pub mod tree;

pub use model::{ForestModel, ModelError, FORMAT_VERSION};
pub use tree::{Node, Tree, N_CLASSES};
