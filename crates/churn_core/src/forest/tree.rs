//! Binary decision trees with per-class leaf weights

use serde::{Deserialize, Serialize};

/// Number of classes every leaf carries weights for (stay, churn)
pub const N_CLASSES: usize = 2;

/// A decision tree node (internal or leaf)
///
/// Internal nodes carry `feature_idx >= 0` and two child indices; leaves
/// carry `feature_idx == -1` and `value` with one weight per class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Column of the aligned row to split on (-1 for leaf nodes)
    #[serde(alias = "feature")]
    pub feature_idx: i32,

    /// Split threshold; rows with `feature <= threshold` go left
    pub threshold: f64,

    /// Class weights `[stay, churn]` for leaf nodes
    #[serde(default)]
    pub value: Option<Vec<f64>>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            value: None,
        }
    }

    /// Create a new leaf node from `[stay, churn]` weights
    pub fn leaf(id: i32, weights: [f64; N_CLASSES]) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            value: Some(weights.to_vec()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1
    }

    /// Leaf weights normalized to a class distribution
    pub fn distribution(&self) -> Option<[f64; N_CLASSES]> {
        let value = self.value.as_ref()?;
        if value.len() != N_CLASSES {
            return None;
        }
        let total: f64 = value.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some([value[0] / total, value[1] / total])
    }
}

/// A single decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf and return its class distribution.
    ///
    /// The walk is bounded by the node count so a cyclic tree fails
    /// instead of looping.
    pub fn evaluate(&self, features: &[f64]) -> Result<[f64; N_CLASSES], String> {
        let mut idx = 0usize;

        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| format!("node index {idx} out of range"))?;

            if node.is_leaf() {
                return node
                    .distribution()
                    .ok_or_else(|| format!("leaf {idx} has no usable class weights"));
            }

            let feature_value = usize::try_from(node.feature_idx)
                .ok()
                .and_then(|f| features.get(f))
                .ok_or_else(|| {
                    format!(
                        "node {idx} splits on feature {} but row has {} columns",
                        node.feature_idx,
                        features.len()
                    )
                })?;

            let next = if *feature_value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = usize::try_from(next)
                .map_err(|_| format!("node {idx} has invalid child index {next}"))?;
        }

        Err("traversal did not reach a leaf".to_string())
    }

    /// Validate tree structure against a row width
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let in_range = |child: i32| child >= 0 && (child as usize) < self.nodes.len();

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                if node.value.is_some() {
                    return Err(format!("Split node {i} carries class weights"));
                }
                if !in_range(node.left) {
                    return Err(format!("Node {} has invalid left child: {}", i, node.left));
                }
                if !in_range(node.right) {
                    return Err(format!("Node {} has invalid right child: {}", i, node.right));
                }
                if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                    return Err(format!(
                        "Internal node {} has invalid feature index: {}",
                        i, node.feature_idx
                    ));
                }
                if !node.threshold.is_finite() {
                    return Err(format!("Internal node {i} has non-finite threshold"));
                }
            } else {
                let Some(value) = node.value.as_ref() else {
                    return Err(format!("Leaf node {i} has no class weights"));
                };
                if value.len() != N_CLASSES {
                    return Err(format!(
                        "Leaf node {i} has {} class weights, expected {N_CLASSES}",
                        value.len()
                    ));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("Leaf node {i} has a negative or non-finite weight"));
                }
                if node.distribution().is_none() {
                    return Err(format!("Leaf node {i} has zero total weight"));
                }
            }
        }

        Ok(())
    }
}
