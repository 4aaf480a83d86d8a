//! Stratified train/test splitting.

use crate::error::AnalyticsError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// A train/test partition of the feature matrix.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<i64>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<i64>,
}

/// Split rows into train and test sets, stratified on the label so every
/// class present with at least two rows appears on both sides.
pub fn stratified_split(
    features: &[Vec<f64>],
    labels: &[i64],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, AnalyticsError> {
    if features.len() != labels.len() {
        return Err(AnalyticsError::training(format!(
            "feature/label length mismatch: {} vs {}",
            features.len(),
            labels.len()
        )));
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(AnalyticsError::training(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = TrainTestSplit {
        x_train: Vec::new(),
        y_train: Vec::new(),
        x_test: Vec::new(),
        y_test: Vec::new(),
    };

    for (label, mut members) in by_class {
        members.shuffle(&mut rng);
        let n = members.len();
        // singleton classes go entirely to train
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        for (pos, idx) in members.into_iter().enumerate() {
            if pos < n_test {
                split.x_test.push(features[idx].clone());
                split.y_test.push(label);
            } else {
                split.x_train.push(features[idx].clone());
                split.y_train.push(label);
            }
        }
    }

    Ok(split)
}
