//! Label encoder: distinct category values mapped to integer codes.

use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Policy for categorical values not present in the fitted classes.
///
/// The default is `Reject`: a clear validation error beats a silently wrong
/// code. `Fallback` is available for deployments that prefer degraded
/// predictions over refusals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UnseenPolicy {
    #[default]
    Reject,
    Fallback {
        code: i64,
    },
}

/// A fitted category-to-code mapping for one column.
///
/// Classes are stored sorted, so code assignment is deterministic: the
/// lexicographically smallest category gets code 0. Fitting the same data
/// twice yields identical codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder from observed values. Duplicates collapse; classes
    /// sort ascending.
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = values.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// The fitted classes, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code for a fitted value, or `None` if unseen.
    pub fn code(&self, value: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|idx| idx as i64)
    }

    /// Encode a value for a named field, applying the unseen policy.
    pub fn encode(
        &self,
        field: &str,
        value: &str,
        policy: UnseenPolicy,
    ) -> Result<i64, AnalyticsError> {
        match self.code(value) {
            Some(code) => Ok(code),
            None => match policy {
                UnseenPolicy::Reject => Err(AnalyticsError::unseen(field, value)),
                UnseenPolicy::Fallback { code } => {
                    tracing::warn!(field, value, code, "unseen category, using fallback code");
                    Ok(code)
                }
            },
        }
    }

    /// The category behind a code, for round-tripping and display.
    pub fn decode(&self, code: i64) -> Result<&str, AnalyticsError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
            .ok_or_else(|| AnalyticsError::Encoding(format!("code {code} has no fitted class")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fit_sorts_and_dedups() {
        let enc = LabelEncoder::fit(["Sales", "Engineering", "Sales", "HR"]);
        assert_eq!(enc.classes(), ["Engineering", "HR", "Sales"]);
        assert_eq!(enc.code("Engineering"), Some(0));
        assert_eq!(enc.code("HR"), Some(1));
        assert_eq!(enc.code("Sales"), Some(2));
    }

    #[test]
    fn test_refit_is_deterministic() {
        let a = LabelEncoder::fit(["b", "a", "c"]);
        let b = LabelEncoder::fit(["c", "b", "a", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseen_rejected_by_default() {
        let enc = LabelEncoder::fit(["Car", "Bus"]);
        let err = enc.encode("commute_mode", "Teleport", UnseenPolicy::Reject);
        assert!(matches!(
            err,
            Err(AnalyticsError::UnseenCategory { ref field, ref value })
                if field == "commute_mode" && value == "Teleport"
        ));
    }

    #[test]
    fn test_unseen_fallback_code() {
        let enc = LabelEncoder::fit(["Car", "Bus"]);
        let code = enc
            .encode("commute_mode", "Teleport", UnseenPolicy::Fallback { code: 0 })
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_decode_out_of_range() {
        let enc = LabelEncoder::fit(["x"]);
        assert!(enc.decode(5).is_err());
        assert!(enc.decode(-1).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_all_fitted_values(values in proptest::collection::vec("[A-Za-z]{1,8}", 1..20)) {
            let enc = LabelEncoder::fit(values.clone());
            for v in &values {
                let code = enc.code(v).expect("fitted value must encode");
                prop_assert_eq!(enc.decode(code).unwrap(), v.as_str());
            }
        }

        #[test]
        fn prop_codes_are_dense_and_unique(values in proptest::collection::vec("[a-z]{1,6}", 1..20)) {
            let enc = LabelEncoder::fit(values);
            let mut codes: Vec<i64> = enc.classes().iter().filter_map(|c| enc.code(c)).collect();
            codes.sort_unstable();
            let expected: Vec<i64> = (0..enc.len() as i64).collect();
            prop_assert_eq!(codes, expected);
        }
    }
}
