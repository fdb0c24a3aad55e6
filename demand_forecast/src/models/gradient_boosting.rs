//! Gradient-boosted regression trees
//!
//! Squared-error boosting with second-order leaf weights and an L2 penalty,
//! grown depth-first with exact greedy splits. Training is fully
//! deterministic: candidate splits are scanned in a fixed order and only a
//! strictly better gain replaces the current best.

use crate::config::BoostingConfig;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::models::{RegressionModel, TrainedRegressionModel};
use demand_math::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Untrained gradient boosting model
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    /// Name of the model
    name: String,
    config: BoostingConfig,
}

/// Node of a regression tree, stored in a flat arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    /// Rows with `features[feature] < threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Single regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

/// Trained gradient boosting ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedGradientBoosting {
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    /// Create a new gradient boosting model
    pub fn new(config: BoostingConfig) -> Result<Self> {
        if config.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of estimators must be positive".to_string(),
            ));
        }
        if !(config.learning_rate > 0.0 && config.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }
        if config.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Max depth must be positive".to_string(),
            ));
        }
        if !(config.l2_regularization >= 0.0) || !(config.min_child_weight >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Regularization terms must be non-negative".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Gradient Boosting (n_estimators={}, max_depth={})",
                config.n_estimators, config.max_depth
            ),
            config,
        })
    }
}

impl RegressionModel for GradientBoosting {
    type Trained = TrainedGradientBoosting;

    fn train(&self, features: &[FeatureVector], targets: &[f64]) -> Result<Self::Trained> {
        if features.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Gradient boosting needs at least one training row".to_string(),
            ));
        }
        if features.len() != targets.len() {
            return Err(ForecastError::ValidationError(format!(
                "Features length ({}) doesn't match targets length ({})",
                features.len(),
                targets.len()
            )));
        }
        if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
            return Err(ForecastError::ValidationError(
                "Training data contains non-finite values".to_string(),
            ));
        }

        let base_score = stats::mean(targets)?;
        let mut predictions = vec![base_score; targets.len()];
        let mut gradients = vec![0.0; targets.len()];
        let mut trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            for i in 0..targets.len() {
                gradients[i] = predictions[i] - targets[i];
            }
            if gradients.iter().all(|g| g.abs() < 1e-12) {
                break;
            }

            let mut builder = TreeBuilder {
                features,
                gradients: &gradients,
                config: &self.config,
                nodes: Vec::new(),
            };
            builder.grow((0..targets.len()).collect(), 0);
            let tree = RegressionTree {
                nodes: builder.nodes,
            };

            for (prediction, row) in predictions.iter_mut().zip(features) {
                *prediction += tree.predict(row);
            }
            trees.push(tree);
        }

        debug!(
            rows = targets.len(),
            trees = trees.len(),
            base_score,
            "fitted gradient boosting ensemble"
        );

        Ok(TrainedGradientBoosting { base_score, trees })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct TreeBuilder<'a> {
    features: &'a [FeatureVector],
    gradients: &'a [f64],
    config: &'a BoostingConfig,
    nodes: Vec<TreeNode>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn score(&self, gradient_sum: f64, hessian_sum: f64) -> f64 {
        gradient_sum * gradient_sum / (hessian_sum + self.config.l2_regularization)
    }

    /// Grow the subtree for `rows` and return its node index
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let gradient_sum: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let hessian_sum = rows.len() as f64;
        let value = -gradient_sum / (hessian_sum + self.config.l2_regularization)
            * self.config.learning_rate;

        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value });

        if depth >= self.config.max_depth {
            return id;
        }
        let Some(split) = self.best_split(&rows, gradient_sum) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.features[i][split.feature] < split.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&self, rows: &[usize], gradient_sum: f64) -> Option<SplitCandidate> {
        let total = rows.len() as f64;
        let parent_score = self.score(gradient_sum, total);
        let mut best: Option<SplitCandidate> = None;

        let mut sorted = rows.to_vec();
        for feature in 0..FEATURE_COUNT {
            sorted.sort_by(|&a, &b| {
                self.features[a][feature]
                    .total_cmp(&self.features[b][feature])
                    .then(a.cmp(&b))
            });

            let mut left_gradient = 0.0;
            for k in 0..sorted.len() - 1 {
                left_gradient += self.gradients[sorted[k]];
                let here = self.features[sorted[k]][feature];
                let next = self.features[sorted[k + 1]][feature];
                if here >= next {
                    continue;
                }

                let left_count = (k + 1) as f64;
                let right_count = total - left_count;
                if left_count < self.config.min_child_weight
                    || right_count < self.config.min_child_weight
                {
                    continue;
                }

                let gain = self.score(left_gradient, left_count)
                    + self.score(gradient_sum - left_gradient, right_count)
                    - parent_score;
                let best_gain = best.as_ref().map_or(MIN_SPLIT_GAIN, |b| b.gain);
                if gain > best_gain {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl RegressionTree {
    /// Output of the leaf that `row` falls into
    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if row[*feature] < *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Children must point forward and stay in bounds, which rules out cycles
    fn validate(&self) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {} is not finite", id));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT || !threshold.is_finite() {
                        return Err(format!("split {} is malformed", id));
                    }
                    for child in [*left, *right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("split {} has an invalid child {}", id, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl TrainedGradientBoosting {
    /// Trees in boosting order
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Check that restored state is internally consistent
    pub fn validate(&self) -> Result<()> {
        if !self.base_score.is_finite() {
            return Err(ForecastError::PersistenceError(
                "base score is not finite".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|reason| {
                ForecastError::PersistenceError(format!("tree {}: {}", i, reason))
            })?;
        }
        Ok(())
    }
}

impl TrainedRegressionModel for TrainedGradientBoosting {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(features))
                .sum::<f64>()
    }

    fn name(&self) -> &str {
        "Gradient Boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> (Vec<FeatureVector>, Vec<f64>) {
        // quantity depends on category and weekend
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..n {
            let category = (i % 3) as f64;
            let weekday = (i % 7) as f64;
            features.push([category, 0.0, 1.0, weekday]);
            targets.push(2.0 + 3.0 * category + if weekday >= 5.0 { 4.0 } else { 0.0 });
        }
        (features, targets)
    }

    #[test]
    fn test_fits_step_function() {
        let (features, targets) = rows(42);
        let model = GradientBoosting::new(BoostingConfig::default()).unwrap();
        let trained = model.train(&features, &targets).unwrap();

        for (row, target) in features.iter().zip(targets.iter()) {
            assert!((trained.predict(row) - target).abs() < 0.5);
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let (features, targets) = rows(30);
        let model = GradientBoosting::new(BoostingConfig::default()).unwrap();

        let a = model.train(&features, &targets).unwrap();
        let b = model.train(&features, &targets).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_target_needs_no_trees() {
        let features = vec![[0.0, 0.0, 1.0, 0.0], [1.0, 0.0, 1.0, 1.0]];
        let model = GradientBoosting::new(BoostingConfig::default()).unwrap();
        let trained = model.train(&features, &[3.0, 3.0]).unwrap();

        assert!(trained.trees().is_empty());
        assert_eq!(trained.predict(&[5.0, 5.0, 5.0, 5.0]), 3.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut config = BoostingConfig::default();
        config.learning_rate = 0.0;
        assert!(GradientBoosting::new(config).is_err());
    }

    #[test]
    fn test_cyclic_tree_fails_validation() {
        let trained = TrainedGradientBoosting {
            base_score: 1.0,
            trees: vec![RegressionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 0,
                    right: 0,
                }],
            }],
        };
        assert!(trained.validate().is_err());
    }
}
