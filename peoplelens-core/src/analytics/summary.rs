//! Headline metrics shown above the dashboard charts.

use crate::data::survey::SurveyDataset;
use serde::{Deserialize, Serialize};

/// Quick summary of the (possibly filtered) dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub employees: usize,
    pub mean_age: f64,
    pub mean_training_hours: f64,
}

impl DatasetSummary {
    pub fn compute(dataset: &SurveyDataset) -> Self {
        let n = dataset.len();
        if n == 0 {
            return Self {
                employees: 0,
                mean_age: 0.0,
                mean_training_hours: 0.0,
            };
        }
        let records = dataset.records();
        Self {
            employees: n,
            mean_age: records.iter().map(|r| r.age).sum::<f64>() / n as f64,
            mean_training_hours: records
                .iter()
                .map(|r| r.training_hours_per_year)
                .sum::<f64>()
                / n as f64,
        }
    }
}
