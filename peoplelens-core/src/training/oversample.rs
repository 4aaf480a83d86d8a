//! Synthetic minority oversampling.
//!
//! Satisfaction scores are heavily skewed toward the middle of the scale.
//! Before fitting, every minority class is topped up to the majority count
//! by interpolating between a class member and one of its nearest
//! same-class neighbors.

use crate::error::AnalyticsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Balance classes by synthesizing minority rows.
///
/// Returns the original rows followed by the synthetic ones. A class with a
/// single member cannot be interpolated and is duplicated instead.
pub fn oversample(
    features: &[Vec<f64>],
    labels: &[i64],
    neighbors: usize,
    seed: u64,
) -> Result<(Vec<Vec<f64>>, Vec<i64>), AnalyticsError> {
    if features.len() != labels.len() {
        return Err(AnalyticsError::training(format!(
            "feature/label length mismatch: {} vs {}",
            features.len(),
            labels.len()
        )));
    }
    if features.is_empty() {
        return Err(AnalyticsError::training("cannot oversample an empty dataset"));
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(i);
    }
    let majority = by_class.values().map(Vec::len).max().unwrap_or(0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out_features = features.to_vec();
    let mut out_labels = labels.to_vec();

    for (label, members) in &by_class {
        let deficit = majority - members.len();
        if deficit == 0 {
            continue;
        }
        tracing::debug!(class = label, deficit, "synthesizing minority samples");
        for _ in 0..deficit {
            let base_idx = members[rng.gen_range(0..members.len())];
            let base = &features[base_idx];
            let synthetic = if members.len() == 1 {
                base.clone()
            } else {
                let neighbor_idx = pick_neighbor(features, members, base_idx, neighbors, &mut rng);
                let neighbor = &features[neighbor_idx];
                let gap: f64 = rng.r#gen();
                base.iter()
                    .zip(neighbor.iter())
                    .map(|(b, n)| b + gap * (n - b))
                    .collect()
            };
            out_features.push(synthetic);
            out_labels.push(*label);
        }
    }

    Ok((out_features, out_labels))
}

/// Pick a random one of the `k` nearest same-class neighbors of `base_idx`.
fn pick_neighbor(
    features: &[Vec<f64>],
    members: &[usize],
    base_idx: usize,
    k: usize,
    rng: &mut StdRng,
) -> usize {
    let base = &features[base_idx];
    let mut candidates: Vec<(f64, usize)> = members
        .iter()
        .filter(|&&i| i != base_idx)
        .map(|&i| (squared_distance(base, &features[i]), i))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    let k = k.clamp(1, candidates.len());
    candidates[rng.gen_range(0..k)].1
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
