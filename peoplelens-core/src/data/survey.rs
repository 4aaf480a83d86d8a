//! Typed survey records and the cleaned analytic dataset.
//!
//! The dataset is one row per employee. Parsing is strict on required
//! columns, while cleaning silently drops rows whose `job_satisfaction`
//! falls outside the 1..=5 scale (bad exports carry 0 and 9 sentinels).

use crate::data::source::DataBatch;
use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Target column predicted by the model.
pub const TARGET_COLUMN: &str = "job_satisfaction";

/// Valid range of the satisfaction scale; rows outside are cleaned away.
pub const SATISFACTION_RANGE: RangeInclusive<i64> = 1..=5;

/// Columns excluded from the feature matrix at training time.
pub const DROPPED_COLUMNS: &[&str] = &["emp_id", "num_companies"];

/// Categorical columns, each backed by a fitted label encoder.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "gender",
    "marital_status",
    "job_level",
    "dept",
    "emp_type",
    "commute_mode",
    "edu_level",
    "have_ot",
];

/// Numeric columns as they appear in the dataset (feature and non-feature).
pub const NUMERIC_COLUMNS: &[&str] = &[
    "age",
    "experience",
    "wlb",
    "work_env",
    "physical_activity_hours",
    "workload",
    "stress",
    "sleep_hours",
    "commute_distance",
    "num_companies",
    "team_size",
    "num_reports",
    "training_hours_per_year",
];

/// Feature columns in the exact order the model consumes them: dataset
/// column order minus identifier, dropped, and target columns.
pub const FEATURE_COLUMNS: &[&str] = &[
    "gender",
    "age",
    "marital_status",
    "job_level",
    "experience",
    "dept",
    "emp_type",
    "wlb",
    "work_env",
    "physical_activity_hours",
    "workload",
    "stress",
    "sleep_hours",
    "commute_mode",
    "commute_distance",
    "team_size",
    "num_reports",
    "edu_level",
    "have_ot",
    "training_hours_per_year",
];

/// One employee survey row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub emp_id: String,
    pub gender: String,
    pub age: f64,
    pub marital_status: String,
    pub job_level: String,
    pub experience: f64,
    pub dept: String,
    pub emp_type: String,
    pub wlb: f64,
    pub work_env: f64,
    pub physical_activity_hours: f64,
    pub workload: f64,
    pub stress: f64,
    pub sleep_hours: f64,
    pub commute_mode: String,
    pub commute_distance: f64,
    pub num_companies: f64,
    pub team_size: f64,
    pub num_reports: f64,
    pub edu_level: String,
    pub have_ot: bool,
    pub training_hours_per_year: f64,
    pub job_satisfaction: i64,
}

impl SurveyRecord {
    /// String form of a categorical column, as fed to the label encoders.
    /// `have_ot` is canonicalized to `"false"`/`"true"` so its codes stay
    /// stable regardless of how the export spells booleans.
    pub fn categorical_value(&self, column: &str) -> Option<String> {
        match column {
            "gender" => Some(self.gender.clone()),
            "marital_status" => Some(self.marital_status.clone()),
            "job_level" => Some(self.job_level.clone()),
            "dept" => Some(self.dept.clone()),
            "emp_type" => Some(self.emp_type.clone()),
            "commute_mode" => Some(self.commute_mode.clone()),
            "edu_level" => Some(self.edu_level.clone()),
            "have_ot" => Some(self.have_ot.to_string()),
            _ => None,
        }
    }

    /// Value of a numeric column.
    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        match column {
            "age" => Some(self.age),
            "experience" => Some(self.experience),
            "wlb" => Some(self.wlb),
            "work_env" => Some(self.work_env),
            "physical_activity_hours" => Some(self.physical_activity_hours),
            "workload" => Some(self.workload),
            "stress" => Some(self.stress),
            "sleep_hours" => Some(self.sleep_hours),
            "commute_distance" => Some(self.commute_distance),
            "num_companies" => Some(self.num_companies),
            "team_size" => Some(self.team_size),
            "num_reports" => Some(self.num_reports),
            "training_hours_per_year" => Some(self.training_hours_per_year),
            _ => None,
        }
    }
}

/// The cleaned analytic dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyDataset {
    records: Vec<SurveyRecord>,
}

impl SurveyDataset {
    pub fn new(records: Vec<SurveyRecord>) -> Self {
        Self { records }
    }

    /// Parse a loaded batch into typed records, dropping rows whose
    /// `job_satisfaction` is outside [`SATISFACTION_RANGE`]. Rows in range
    /// are preserved unchanged.
    pub fn from_batch(batch: &DataBatch) -> Result<Self, AnalyticsError> {
        let total = batch.row_count();
        let mut records = Vec::with_capacity(total);
        for (i, row) in batch.rows.iter().enumerate() {
            let record = parse_record(batch, row)
                .map_err(|e| AnalyticsError::dataset(format!("row {i}: {e}")))?;
            if SATISFACTION_RANGE.contains(&record.job_satisfaction) {
                records.push(record);
            }
        }
        let dropped = total - records.len();
        if dropped > 0 {
            tracing::debug!(dropped, total, "filtered rows with out-of-range satisfaction");
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct values of a categorical column, for form selectors
    /// and encoder fitting.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let set: BTreeSet<String> = self
            .records
            .iter()
            .filter_map(|r| r.categorical_value(column))
            .collect();
        set.into_iter().collect()
    }

    /// Observed (min, max) of the age column; `None` on an empty dataset.
    pub fn age_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.records.iter().map(|r| r.age);
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for age in iter {
            min = min.min(age);
            max = max.max(age);
        }
        Some((min, max))
    }
}

fn parse_record(batch: &DataBatch, row: &[serde_json::Value]) -> Result<SurveyRecord, String> {
    Ok(SurveyRecord {
        emp_id: get_string(batch, row, "emp_id")?,
        gender: get_string(batch, row, "gender")?,
        age: get_f64(batch, row, "age")?,
        marital_status: get_string(batch, row, "marital_status")?,
        job_level: get_string(batch, row, "job_level")?,
        experience: get_f64(batch, row, "experience")?,
        dept: get_string(batch, row, "dept")?,
        emp_type: get_string(batch, row, "emp_type")?,
        wlb: get_f64(batch, row, "wlb")?,
        work_env: get_f64(batch, row, "work_env")?,
        physical_activity_hours: get_f64(batch, row, "physical_activity_hours")?,
        workload: get_f64(batch, row, "workload")?,
        stress: get_f64(batch, row, "stress")?,
        sleep_hours: get_f64(batch, row, "sleep_hours")?,
        commute_mode: get_string(batch, row, "commute_mode")?,
        commute_distance: get_f64(batch, row, "commute_distance")?,
        num_companies: get_f64(batch, row, "num_companies")?,
        team_size: get_f64(batch, row, "team_size")?,
        num_reports: get_f64(batch, row, "num_reports")?,
        edu_level: get_string(batch, row, "edu_level")?,
        have_ot: get_bool(batch, row, "have_ot")?,
        training_hours_per_year: get_f64(batch, row, "training_hours_per_year")?,
        job_satisfaction: get_i64(batch, row, TARGET_COLUMN)?,
    })
}

fn get_cell<'a>(
    batch: &DataBatch,
    row: &'a [serde_json::Value],
    column: &str,
) -> Result<&'a serde_json::Value, String> {
    let idx = batch
        .column_index(column)
        .ok_or_else(|| format!("missing required column '{column}'"))?;
    row.get(idx)
        .ok_or_else(|| format!("missing cell for column '{column}'"))
}

fn get_string(batch: &DataBatch, row: &[serde_json::Value], column: &str) -> Result<String, String> {
    match get_cell(batch, row, column)? {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("column '{column}' has non-text value {other}")),
    }
}

fn get_f64(batch: &DataBatch, row: &[serde_json::Value], column: &str) -> Result<f64, String> {
    match get_cell(batch, row, column)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("column '{column}' value out of f64 range")),
        other => Err(format!("column '{column}' has non-numeric value {other}")),
    }
}

fn get_i64(batch: &DataBatch, row: &[serde_json::Value], column: &str) -> Result<i64, String> {
    match get_cell(batch, row, column)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("column '{column}' value out of i64 range")),
        other => Err(format!("column '{column}' has non-integer value {other}")),
    }
}

fn get_bool(batch: &DataBatch, row: &[serde_json::Value], column: &str) -> Result<bool, String> {
    match get_cell(batch, row, column)? {
        serde_json::Value::Bool(b) => Ok(*b),
        serde_json::Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(format!("column '{column}' has non-boolean value '{other}'")),
        },
        serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0) != 0.0),
        other => Err(format!("column '{column}' has non-boolean value {other}")),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A plausible record for tests; override fields as needed.
    pub fn record(emp_id: &str, dept: &str, age: f64, satisfaction: i64) -> SurveyRecord {
        SurveyRecord {
            emp_id: emp_id.to_string(),
            gender: "Male".to_string(),
            age,
            marital_status: "Single".to_string(),
            job_level: "Mid".to_string(),
            experience: 5.0,
            dept: dept.to_string(),
            emp_type: "Full-Time".to_string(),
            wlb: 3.0,
            work_env: 3.0,
            physical_activity_hours: 3.0,
            workload: 3.0,
            stress: 3.0,
            sleep_hours: 7.0,
            commute_mode: "Car".to_string(),
            commute_distance: 10.0,
            num_companies: 2.0,
            team_size: 10.0,
            num_reports: 0.0,
            edu_level: "Bachelor".to_string(),
            have_ot: false,
            training_hours_per_year: 20.0,
            job_satisfaction: satisfaction,
        }
    }
}
