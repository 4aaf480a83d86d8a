//! Single-record prediction against loaded artifacts.
//!
//! The predictor is built once at startup from read-only artifacts and
//! replays the training-time encoding exactly: fitted codes for categorical
//! fields, zero defaults for any feature column absent from the input, and
//! the persisted column order before the forest sees anything.

use crate::encode::UnseenPolicy;
use crate::error::AnalyticsError;
use crate::model::ModelArtifacts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The raw prediction form payload. Numeric fields default to the form's
/// documented slider defaults; categorical fields other than gender and
/// marital status must be supplied (the form populates them from the live
/// dataset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default = "default_age")]
    pub age: f64,
    #[serde(default = "default_marital_status")]
    pub marital_status: String,
    pub job_level: String,
    #[serde(default = "default_experience")]
    pub experience: f64,
    pub dept: String,
    pub emp_type: String,
    #[serde(default = "default_mid_scale")]
    pub wlb: f64,
    #[serde(default = "default_mid_scale")]
    pub work_env: f64,
    #[serde(default = "default_activity_hours")]
    pub physical_activity_hours: f64,
    #[serde(default = "default_mid_scale")]
    pub workload: f64,
    #[serde(default = "default_mid_scale")]
    pub stress: f64,
    #[serde(default = "default_sleep_hours")]
    pub sleep_hours: f64,
    pub commute_mode: String,
    #[serde(default = "default_commute_distance")]
    pub commute_distance: f64,
    #[serde(default = "default_num_companies")]
    pub num_companies: f64,
    #[serde(default = "default_team_size")]
    pub team_size: f64,
    #[serde(default)]
    pub num_reports: f64,
    pub edu_level: String,
    #[serde(default = "default_have_ot")]
    pub have_ot: bool,
    #[serde(default = "default_training_hours")]
    pub training_hours_per_year: f64,
}

fn default_gender() -> String {
    "Male".to_string()
}
fn default_marital_status() -> String {
    "Single".to_string()
}
fn default_age() -> f64 {
    30.0
}
fn default_experience() -> f64 {
    5.0
}
fn default_mid_scale() -> f64 {
    3.0
}
fn default_activity_hours() -> f64 {
    3.0
}
fn default_sleep_hours() -> f64 {
    7.0
}
fn default_commute_distance() -> f64 {
    10.0
}
fn default_num_companies() -> f64 {
    2.0
}
fn default_team_size() -> f64 {
    10.0
}
fn default_have_ot() -> bool {
    true
}
fn default_training_hours() -> f64 {
    20.0
}

impl PredictionInput {
    /// Categorical fields as (name, raw value) pairs, in declared order.
    pub fn categorical_values(&self) -> [(&'static str, String); 8] {
        [
            ("gender", self.gender.clone()),
            ("marital_status", self.marital_status.clone()),
            ("job_level", self.job_level.clone()),
            ("dept", self.dept.clone()),
            ("emp_type", self.emp_type.clone()),
            ("commute_mode", self.commute_mode.clone()),
            ("edu_level", self.edu_level.clone()),
            ("have_ot", self.have_ot.to_string()),
        ]
    }

    /// Numeric fields as (name, value) pairs. Includes fields the model was
    /// not trained on (`num_companies`); alignment drops them.
    pub fn numeric_values(&self) -> [(&'static str, f64); 13] {
        [
            ("age", self.age),
            ("experience", self.experience),
            ("wlb", self.wlb),
            ("work_env", self.work_env),
            ("physical_activity_hours", self.physical_activity_hours),
            ("workload", self.workload),
            ("stress", self.stress),
            ("sleep_hours", self.sleep_hours),
            ("commute_distance", self.commute_distance),
            ("num_companies", self.num_companies),
            ("team_size", self.team_size),
            ("num_reports", self.num_reports),
            ("training_hours_per_year", self.training_hours_per_year),
        ]
    }
}

/// Read-only prediction engine over loaded artifacts.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: ModelArtifacts,
    policy: UnseenPolicy,
}

impl Predictor {
    pub fn new(artifacts: ModelArtifacts, policy: UnseenPolicy) -> Self {
        Self { artifacts, policy }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Encode, align, and predict a single satisfaction label in 1..=5.
    pub fn predict(&self, input: &PredictionInput) -> Result<i64, AnalyticsError> {
        let vector = self.feature_vector(input)?;
        let label = self.artifacts.model.predict(&vector)?;
        tracing::debug!(label, "predicted satisfaction");
        Ok(label)
    }

    /// The aligned feature vector for an input, in the persisted column
    /// order. Exposed so tests can pin the alignment contract directly.
    pub fn feature_vector(&self, input: &PredictionInput) -> Result<Vec<f64>, AnalyticsError> {
        let mut values: BTreeMap<String, f64> = BTreeMap::new();
        for (field, raw) in input.categorical_values() {
            let code = self.artifacts.encoders.encode(field, &raw, self.policy)?;
            values.insert(field.to_string(), code as f64);
        }
        for (field, value) in input.numeric_values() {
            values.insert(field.to_string(), value);
        }
        Ok(self.artifacts.feature_columns.align(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::data::survey::{SurveyDataset, fixtures::record};
    use crate::training::pipeline::train;

    fn trained_predictor(policy: UnseenPolicy) -> Predictor {
        let mut records = Vec::new();
        let depts = ["Engineering", "Sales"];
        for i in 0..30i64 {
            let mut r = record(
                &format!("E{i:02}"),
                depts[i as usize % 2],
                25.0 + i as f64,
                (i % 5) + 1,
            );
            r.stress = ((i % 5) + 1) as f64;
            records.push(r);
        }
        let outcome = train(
            &SurveyDataset::new(records),
            &TrainingConfig {
                n_estimators: 8,
                max_depth: Some(5),
                test_fraction: 0.2,
                oversample_neighbors: 3,
                seed: 42,
            },
        )
        .unwrap();
        Predictor::new(outcome.artifacts, policy)
    }

    fn engineering_input() -> PredictionInput {
        serde_json::from_value(serde_json::json!({
            "dept": "Engineering",
            "job_level": "Mid",
            "emp_type": "Full-Time",
            "commute_mode": "Car",
            "edu_level": "Bachelor",
            "have_ot": false,
            "age": 30.0,
            "wlb": 3.0,
            "stress": 3.0,
            "sleep_hours": 7.0
        }))
        .unwrap()
    }

    #[test]
    fn test_predict_returns_label_in_scale() {
        let predictor = trained_predictor(UnseenPolicy::Reject);
        let label = predictor.predict(&engineering_input()).unwrap();
        assert!((1..=5).contains(&label));
    }

    #[test]
    fn test_feature_vector_matches_persisted_order() {
        let predictor = trained_predictor(UnseenPolicy::Reject);
        let input = engineering_input();
        let vector = predictor.feature_vector(&input).unwrap();
        let columns = predictor.artifacts().feature_columns.names();
        assert_eq!(vector.len(), columns.len());
        let age_idx = columns.iter().position(|c| c == "age").unwrap();
        assert_eq!(vector[age_idx], 30.0);
        let dept_idx = columns.iter().position(|c| c == "dept").unwrap();
        let expected = predictor.artifacts().encoders.dept.code("Engineering").unwrap();
        assert_eq!(vector[dept_idx], expected as f64);
    }

    #[test]
    fn test_unseen_department_rejected() {
        let predictor = trained_predictor(UnseenPolicy::Reject);
        let mut input = engineering_input();
        input.dept = "Interdimensional Research".to_string();
        let err = predictor.predict(&input).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnseenCategory { .. }));
    }

    #[test]
    fn test_unseen_department_with_fallback_predicts() {
        let predictor = trained_predictor(UnseenPolicy::Fallback { code: 0 });
        let mut input = engineering_input();
        input.dept = "Interdimensional Research".to_string();
        let label = predictor.predict(&input).unwrap();
        assert!((1..=5).contains(&label));
    }

    #[test]
    fn test_serde_defaults_cover_numeric_fields() {
        let input = engineering_input();
        assert_eq!(input.experience, 5.0);
        assert_eq!(input.num_companies, 2.0);
        assert_eq!(input.training_hours_per_year, 20.0);
        assert_eq!(input.gender, "Male");
    }
}
