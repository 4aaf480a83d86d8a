//! Dashboard dataset filtering: department multi-select plus age range.

use crate::data::survey::{SurveyDataset, SurveyRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter state coming from the dashboard sidebar. Unset parts match
/// everything, matching the behavior of a multi-select with all options
/// checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardFilter {
    /// Departments to keep; `None` keeps all.
    #[serde(default)]
    pub depts: Option<BTreeSet<String>>,
    /// Inclusive lower age bound.
    #[serde(default)]
    pub age_min: Option<f64>,
    /// Inclusive upper age bound.
    #[serde(default)]
    pub age_max: Option<f64>,
}

impl DashboardFilter {
    pub fn matches(&self, record: &SurveyRecord) -> bool {
        if let Some(depts) = &self.depts {
            if !depts.contains(&record.dept) {
                return false;
            }
        }
        if let Some(min) = self.age_min {
            if record.age < min {
                return false;
            }
        }
        if let Some(max) = self.age_max {
            if record.age > max {
                return false;
            }
        }
        true
    }

    /// Apply the filter, producing the dataset the charts are computed over.
    pub fn apply(&self, dataset: &SurveyDataset) -> SurveyDataset {
        SurveyDataset::new(
            dataset
                .records()
                .iter()
                .filter(|r| self.matches(r))
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::survey::fixtures::record;

    fn dataset() -> SurveyDataset {
        SurveyDataset::new(vec![
            record("a", "Engineering", 25.0, 3),
            record("b", "Engineering", 45.0, 4),
            record("c", "Sales", 30.0, 2),
            record("d", "HR", 52.0, 5),
        ])
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let ds = dataset();
        assert_eq!(DashboardFilter::default().apply(&ds).len(), ds.len());
    }

    #[test]
    fn test_dept_and_age_filter() {
        let ds = dataset();
        let filter = DashboardFilter {
            depts: Some(["Engineering".to_string()].into_iter().collect()),
            age_min: Some(25.0),
            age_max: Some(45.0),
        };
        let filtered = filter.apply(&ds);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.records().iter().all(|r| r.dept == "Engineering"));
        assert!(
            filtered
                .records()
                .iter()
                .all(|r| (25.0..=45.0).contains(&r.age))
        );
    }

    #[test]
    fn test_strict_subset_when_domain_restricted() {
        let ds = dataset();
        let filter = DashboardFilter {
            depts: Some(["Sales".to_string(), "HR".to_string()].into_iter().collect()),
            age_min: None,
            age_max: None,
        };
        let filtered = filter.apply(&ds);
        assert!(filtered.len() < ds.len());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        let ds = dataset();
        let filter = DashboardFilter {
            depts: None,
            age_min: Some(30.0),
            age_max: Some(45.0),
        };
        let filtered = filter.apply(&ds);
        let ages: Vec<f64> = filtered.records().iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![45.0, 30.0]);
    }
}
