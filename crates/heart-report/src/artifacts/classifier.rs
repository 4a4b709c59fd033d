//! Pre-fitted binary classifiers.
//!
//! Two artifact kinds are supported, both stored as JSON tagged by `kind`:
//!
//! - `random_forest`: trees in scikit-learn array form (`children_left`,
//!   `children_right`, `feature`, `threshold`, `value`). A sample goes left
//!   when `x[feature] <= threshold`; leaf class weights are normalized and
//!   averaged across trees, and the label is the argmax.
//! - `logistic`: `sigmoid(w·x + b) >= threshold`.
//!
//! Only labels are surfaced to callers; probabilities stay internal.

use crate::error::{ReportError, Result, Stage};
use crate::matrix::FeatureMatrix;
use crate::types::Prediction;
use serde::{Deserialize, Serialize};

/// Node index marking "no child" in the array encoding.
pub const LEAF: i64 = -1;

/// One fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `value[node][class]`.
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        let n = self.n_nodes();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("tree arrays have different lengths".to_string());
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "node {} has {} class weights, expected {}",
                    node,
                    self.value[node].len(),
                    n_classes
                ));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                if self.value[node].iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has no class weight", node));
                }
                continue;
            }

            for child in [left, right] {
                // children always come after their parent in fitted trees
                if child <= node as i64 || child as usize >= n {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!(
                    "node {} splits on feature {} but the model has {}",
                    node, feature, n_features
                ));
            }
        }
        Ok(())
    }

    /// Class probabilities for one sample.
    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

/// A fitted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest {
        n_features: usize,
        /// Label for each class index, e.g. `[0, 1]`.
        classes: Vec<u8>,
        trees: Vec<DecisionTree>,
    },
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

fn default_threshold() -> f64 {
    0.5
}

impl Classifier {
    /// Number of features the classifier was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest { n_features, .. } => *n_features,
            Classifier::Logistic { coefficients, .. } => coefficients.len(),
        }
    }

    /// Check the fitted structure is usable.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Classifier::RandomForest {
                n_features,
                classes,
                trees,
            } => {
                if *n_features == 0 {
                    return Err("forest has no features".to_string());
                }
                if classes.is_empty() || classes.iter().any(|c| *c > 1) {
                    return Err(format!("classes {:?} are not binary labels", classes));
                }
                if trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features, classes.len())
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                }
                Ok(())
            }
            Classifier::Logistic {
                coefficients,
                intercept,
                threshold,
            } => {
                if coefficients.is_empty() {
                    return Err("logistic model has no coefficients".to_string());
                }
                if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return Err("coefficients must be finite".to_string());
                }
                if !(0.0..=1.0).contains(threshold) {
                    return Err(format!("threshold {} outside [0, 1]", threshold));
                }
                Ok(())
            }
        }
    }

    /// One label per row.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the matrix width differs from [`n_features`](Self::n_features).
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<Prediction>> {
        let expected = self.n_features();
        if matrix.width() != expected {
            return Err(ReportError::DimensionMismatch {
                stage: Stage::Classifier,
                expected,
                found: matrix.width(),
            });
        }

        matrix.rows().iter().map(|row| self.predict_row(row)).collect()
    }

    fn predict_row(&self, row: &[f64]) -> Result<Prediction> {
        let label = match self {
            Classifier::RandomForest { classes, trees, .. } => {
                let mut mean = vec![0.0; classes.len()];
                for tree in trees {
                    for (acc, p) in mean.iter_mut().zip(tree.predict_proba(row)) {
                        *acc += p;
                    }
                }
                // first maximum wins ties
                let best = mean
                    .iter()
                    .enumerate()
                    .fold(0usize, |best, (i, p)| if *p > mean[best] { i } else { best });
                classes[best]
            }
            Classifier::Logistic {
                coefficients,
                intercept,
                threshold,
            } => {
                let z: f64 = coefficients.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
                    + intercept;
                let p = 1.0 / (1.0 + (-z).exp());
                u8::from(p >= *threshold)
            }
        };

        Prediction::try_from(label).map_err(ReportError::InvalidInput)
    }
}
