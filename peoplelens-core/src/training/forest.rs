//! Class-weighted random forest classifier.
//!
//! CART trees on Gini impurity with bootstrap row sampling and sqrt-feature
//! subsampling at every split. Sample weights are balanced per class
//! (`n / (n_classes * count(class))`) so the skewed satisfaction
//! distribution does not drown out the rare levels. Trees are plain data
//! and serialize with serde, which is what makes the flat-file model
//! artifact possible.

use crate::error::AnalyticsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forest fitting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// One node of a fitted tree, arena-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        label: i64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn predict(&self, features: &[f64]) -> i64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// A fitted random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    classes: Vec<i64>,
    n_features: usize,
}

impl RandomForest {
    /// Fit a forest on the given matrix. Rows are feature vectors, labels
    /// are class ids.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[i64],
        config: &ForestConfig,
    ) -> Result<Self, AnalyticsError> {
        if features.is_empty() {
            return Err(AnalyticsError::training("cannot fit on an empty dataset"));
        }
        if features.len() != labels.len() {
            return Err(AnalyticsError::training(format!(
                "feature/label length mismatch: {} vs {}",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 {
            return Err(AnalyticsError::training("feature vectors are empty"));
        }
        if let Some(bad) = features.iter().position(|row| row.len() != n_features) {
            return Err(AnalyticsError::training(format!(
                "row {bad} has {} features, expected {n_features}",
                features[bad].len()
            )));
        }
        if config.n_estimators == 0 {
            return Err(AnalyticsError::training("n_estimators must be at least 1"));
        }

        let weights = balanced_weights(labels);
        let mut classes: Vec<i64> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let n_rows = features.len();
        let n_sub_features = (n_features as f64).sqrt().floor().max(1.0) as usize;

        let mut trees = Vec::with_capacity(config.n_estimators);
        for t in 0..config.n_estimators {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> =
                (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let mut builder = TreeBuilder {
                features,
                labels,
                weights: &weights,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split.max(2),
                n_sub_features,
                n_features,
                nodes: Vec::new(),
            };
            builder.grow(bootstrap, 0, &mut rng);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        tracing::debug!(
            trees = trees.len(),
            n_features,
            classes = classes.len(),
            "fitted random forest"
        );

        Ok(Self {
            trees,
            classes,
            n_features,
        })
    }

    /// Majority-vote prediction for a single aligned feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<i64, AnalyticsError> {
        if features.len() != self.n_features {
            return Err(AnalyticsError::inference(format!(
                "input has {} features, model expects {}",
                features.len(),
                self.n_features
            )));
        }
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict(features)).or_insert(0) += 1;
        }
        // ties break toward the smaller label, which BTreeMap ordering gives us
        votes
            .into_iter()
            .max_by_key(|(label, count)| (*count, std::cmp::Reverse(*label)))
            .map(|(label, _)| label)
            .ok_or_else(|| AnalyticsError::inference("forest has no trees"))
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, AnalyticsError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Class labels seen during fitting, ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Balanced per-sample weights: `n / (n_classes * count(class))`.
fn balanced_weights(labels: &[i64]) -> Vec<f64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    let n = labels.len() as f64;
    let k = counts.len() as f64;
    labels
        .iter()
        .map(|label| n / (k * counts[label] as f64))
        .collect()
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [i64],
    weights: &'a [f64],
    max_depth: Option<usize>,
    min_samples_split: usize,
    n_sub_features: usize,
    n_features: usize,
    nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// Grow a subtree over `indices`, returning its arena index.
    fn grow(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let depth_capped = self.max_depth.is_some_and(|d| depth >= d);
        if depth_capped || indices.len() < self.min_samples_split || self.is_pure(&indices) {
            return self.push_leaf(&indices);
        }

        let Some(best) = self.best_split(&indices, rng) else {
            return self.push_leaf(&indices);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[i][best.feature] <= best.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return self.push_leaf(&indices);
        }

        let node = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { label: 0 }); // placeholder until children exist
        let left = self.grow(left_idx, depth + 1, rng);
        let right = self.grow(right_idx, depth + 1, rng);
        self.nodes[node] = TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        indices
            .windows(2)
            .all(|w| self.labels[w[0]] == self.labels[w[1]])
    }

    fn push_leaf(&mut self, indices: &[usize]) -> usize {
        let mut weight_by_class: BTreeMap<i64, f64> = BTreeMap::new();
        for &i in indices {
            *weight_by_class.entry(self.labels[i]).or_insert(0.0) += self.weights[i];
        }
        let label = weight_by_class
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, _)| label)
            .unwrap_or(0);
        self.nodes.push(TreeNode::Leaf { label });
        self.nodes.len() - 1
    }

    /// Exhaustive threshold search over a random feature subset.
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let candidates =
            rand::seq::index::sample(rng, self.n_features, self.n_sub_features.min(self.n_features));

        let parent_impurity = {
            let mut by_class: BTreeMap<i64, f64> = BTreeMap::new();
            let mut total = 0.0;
            for &i in indices {
                *by_class.entry(self.labels[i]).or_insert(0.0) += self.weights[i];
                total += self.weights[i];
            }
            gini(&by_class, total)
        };

        let mut best: Option<BestSplit> = None;
        for feature in candidates {
            if let Some(split) = self.best_threshold(indices, feature) {
                if split.impurity < parent_impurity - 1e-12
                    && best.as_ref().is_none_or(|b| split.impurity < b.impurity)
                {
                    best = Some(split);
                }
            }
        }
        best
    }

    /// Best threshold for one feature: sort by value, sweep split points
    /// between distinct neighbors, track the weighted child Gini.
    fn best_threshold(&self, indices: &[usize], feature: usize) -> Option<BestSplit> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

        let total_weight: f64 = sorted.iter().map(|&i| self.weights[i]).sum();
        let mut right: BTreeMap<i64, f64> = BTreeMap::new();
        for &i in &sorted {
            *right.entry(self.labels[i]).or_insert(0.0) += self.weights[i];
        }
        let mut left: BTreeMap<i64, f64> = BTreeMap::new();
        let mut left_weight = 0.0;

        let mut best: Option<BestSplit> = None;
        for w in sorted.windows(2) {
            let (i, j) = (w[0], w[1]);
            let weight = self.weights[i];
            *left.entry(self.labels[i]).or_insert(0.0) += weight;
            left_weight += weight;
            if let Some(entry) = right.get_mut(&self.labels[i]) {
                *entry -= weight;
            }

            let (vi, vj) = (self.features[i][feature], self.features[j][feature]);
            if vi == vj {
                continue;
            }
            let right_weight = total_weight - left_weight;
            let impurity = (left_weight * gini(&left, left_weight)
                + right_weight * gini(&right, right_weight))
                / total_weight;
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(BestSplit {
                    feature,
                    threshold: (vi + vj) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

/// Gini impurity of a weighted class distribution.
fn gini(weight_by_class: &BTreeMap<i64, f64>, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - weight_by_class
        .values()
        .map(|w| (w / total).powi(2))
        .sum::<f64>()
}
