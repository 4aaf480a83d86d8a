//! Classification metrics: per-class precision/recall/F1 and macro averages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metrics for a single class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: i64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation report for the fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub total: usize,
}

impl ClassificationReport {
    /// Compute a report from parallel true/predicted label slices.
    pub fn from_predictions(y_true: &[i64], y_pred: &[i64]) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let mut labels: Vec<i64> = y_true.iter().chain(y_pred.iter()).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let mut tp: BTreeMap<i64, usize> = BTreeMap::new();
        let mut fp: BTreeMap<i64, usize> = BTreeMap::new();
        let mut fn_: BTreeMap<i64, usize> = BTreeMap::new();
        let mut support: BTreeMap<i64, usize> = BTreeMap::new();
        let mut correct = 0usize;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            *support.entry(*t).or_insert(0) += 1;
            if t == p {
                *tp.entry(*t).or_insert(0) += 1;
                correct += 1;
            } else {
                *fp.entry(*p).or_insert(0) += 1;
                *fn_.entry(*t).or_insert(0) += 1;
            }
        }

        let per_class: Vec<ClassMetrics> = labels
            .iter()
            .map(|label| {
                let tp = *tp.get(label).unwrap_or(&0) as f64;
                let fp = *fp.get(label).unwrap_or(&0) as f64;
                let fn_ = *fn_.get(label).unwrap_or(&0) as f64;
                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, tp + fn_);
                let f1 = ratio(2.0 * precision * recall, precision + recall);
                ClassMetrics {
                    label: *label,
                    precision,
                    recall,
                    f1,
                    support: *support.get(label).unwrap_or(&0),
                }
            })
            .collect();

        let k = per_class.len().max(1) as f64;
        let total = y_true.len();
        Self {
            macro_precision: per_class.iter().map(|m| m.precision).sum::<f64>() / k,
            macro_recall: per_class.iter().map(|m| m.recall).sum::<f64>() / k,
            macro_f1: per_class.iter().map(|m| m.f1).sum::<f64>() / k,
            accuracy: ratio(correct as f64, total as f64),
            per_class,
            total,
        }
    }
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom == 0.0 { 0.0 } else { num / denom }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = vec![1, 2, 3, 1, 2];
        let report = ClassificationReport::from_predictions(&y, &y);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_f1, 1.0);
        for m in &report.per_class {
            assert_eq!(m.precision, 1.0);
            assert_eq!(m.recall, 1.0);
        }
    }

    #[test]
    fn test_known_confusion() {
        // class 1: tp=2, fn=1; class 2: tp=1, fp=1
        let y_true = vec![1, 1, 1, 2];
        let y_pred = vec![1, 1, 2, 2];
        let report = ClassificationReport::from_predictions(&y_true, &y_pred);
        assert_eq!(report.accuracy, 0.75);

        let c1 = &report.per_class[0];
        assert_eq!(c1.label, 1);
        assert_eq!(c1.precision, 1.0);
        assert!((c1.recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(c1.support, 3);

        let c2 = &report.per_class[1];
        assert_eq!(c2.precision, 0.5);
        assert_eq!(c2.recall, 1.0);
        assert_eq!(c2.support, 1);
    }

    #[test]
    fn test_class_never_predicted_has_zero_precision() {
        let y_true = vec![1, 2];
        let y_pred = vec![1, 1];
        let report = ClassificationReport::from_predictions(&y_true, &y_pred);
        let c2 = report.per_class.iter().find(|m| m.label == 2).unwrap();
        assert_eq!(c2.precision, 0.0);
        assert_eq!(c2.recall, 0.0);
        assert_eq!(c2.f1, 0.0);
    }

    #[test]
    fn test_display_contains_headers() {
        let report = ClassificationReport::from_predictions(&[1, 2], &[1, 2]);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("accuracy"));
    }
}
