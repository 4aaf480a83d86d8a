//! Feature column order and input vector alignment.
//!
//! The trained model consumes features by position. The persisted column
//! order is the contract: every inference input is reindexed to it, missing
//! features default to zero, and extra keys are ignored (the form collects
//! fields the model never sees, e.g. `num_companies`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The ordered feature names the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureColumns(Vec<String>);

impl FeatureColumns {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    /// The canonical training-time order, derived from the declared survey
    /// feature columns.
    pub fn canonical() -> Self {
        Self(
            crate::data::survey::FEATURE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reindex named values into this column order. Absent columns become
    /// 0.0; keys not in the order are dropped.
    pub fn align(&self, values: &BTreeMap<String, f64>) -> Vec<f64> {
        self.0
            .iter()
            .map(|col| values.get(col).copied().unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns() -> FeatureColumns {
        FeatureColumns::new(vec!["a".into(), "b".into(), "c".into()])
    }

    #[test]
    fn test_align_orders_by_column_list() {
        let mut values = BTreeMap::new();
        values.insert("c".to_string(), 3.0);
        values.insert("a".to_string(), 1.0);
        values.insert("b".to_string(), 2.0);
        assert_eq!(columns().align(&values), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_align_defaults_missing_to_zero() {
        let mut values = BTreeMap::new();
        values.insert("b".to_string(), 2.0);
        assert_eq!(columns().align(&values), vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_align_ignores_extra_keys() {
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), 1.0);
        values.insert("num_companies".to_string(), 9.0);
        let aligned = columns().align(&values);
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_canonical_matches_declared_order() {
        let canonical = FeatureColumns::canonical();
        assert_eq!(canonical.len(), crate::data::survey::FEATURE_COLUMNS.len());
        assert_eq!(canonical.names()[0], "gender");
        assert_eq!(
            canonical.names().last().map(String::as_str),
            Some("training_hours_per_year")
        );
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let json = serde_json::to_string(&columns()).unwrap();
        assert_eq!(json, r#"["a","b","c"]"#);
        let parsed: FeatureColumns = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, columns());
    }
}
