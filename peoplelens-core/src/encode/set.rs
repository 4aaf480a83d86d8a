//! The fitted encoder set: one explicit encoder per categorical field.
//!
//! This is deliberately not a map keyed by strings. Each declared
//! categorical column gets a named encoder, and [`EncoderSet::pairs`] is the
//! single compile-time list that encoding and schema validation both walk.

use crate::data::schema::{ColumnType, SchemaDefinition};
use crate::data::survey::SurveyDataset;
use crate::encode::label::{LabelEncoder, UnseenPolicy};
use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Fitted encoders for every categorical survey column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSet {
    pub gender: LabelEncoder,
    pub marital_status: LabelEncoder,
    pub job_level: LabelEncoder,
    pub dept: LabelEncoder,
    pub emp_type: LabelEncoder,
    pub commute_mode: LabelEncoder,
    pub edu_level: LabelEncoder,
    pub have_ot: LabelEncoder,
}

impl EncoderSet {
    /// Fit all encoders from the cleaned dataset.
    pub fn fit(dataset: &SurveyDataset) -> Self {
        let fit_column = |column: &str| LabelEncoder::fit(dataset.distinct(column));
        Self {
            gender: fit_column("gender"),
            marital_status: fit_column("marital_status"),
            job_level: fit_column("job_level"),
            dept: fit_column("dept"),
            emp_type: fit_column("emp_type"),
            commute_mode: fit_column("commute_mode"),
            edu_level: fit_column("edu_level"),
            have_ot: fit_column("have_ot"),
        }
    }

    /// The declared (field, encoder) pairs, in dataset column order.
    pub fn pairs(&self) -> [(&'static str, &LabelEncoder); 8] {
        [
            ("gender", &self.gender),
            ("marital_status", &self.marital_status),
            ("job_level", &self.job_level),
            ("dept", &self.dept),
            ("emp_type", &self.emp_type),
            ("commute_mode", &self.commute_mode),
            ("edu_level", &self.edu_level),
            ("have_ot", &self.have_ot),
        ]
    }

    /// Encoder for a named field, if that field is categorical.
    pub fn get(&self, field: &str) -> Option<&LabelEncoder> {
        self.pairs()
            .into_iter()
            .find(|(name, _)| *name == field)
            .map(|(_, enc)| enc)
    }

    /// Whether a field is one of the declared categorical columns.
    pub fn is_categorical(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Encode one field's raw value under the given policy.
    pub fn encode(
        &self,
        field: &str,
        value: &str,
        policy: UnseenPolicy,
    ) -> Result<i64, AnalyticsError> {
        let encoder = self.get(field).ok_or_else(|| {
            AnalyticsError::Encoding(format!("'{field}' is not a categorical field"))
        })?;
        encoder.encode(field, value, policy)
    }

    /// Check every declared categorical field against a dataset schema.
    /// Run at startup so a schema drift fails loudly before serving.
    pub fn validate_schema(&self, schema: &SchemaDefinition) -> Result<(), AnalyticsError> {
        for (field, encoder) in self.pairs() {
            let column = schema.column(field).ok_or_else(|| {
                AnalyticsError::schema(format!("categorical column '{field}' missing from schema"))
            })?;
            match column.dtype {
                ColumnType::String | ColumnType::Boolean => {}
                ref other => {
                    return Err(AnalyticsError::schema(format!(
                        "categorical column '{field}' has dtype {other:?}, expected string or boolean"
                    )));
                }
            }
            if encoder.is_empty() {
                return Err(AnalyticsError::schema(format!(
                    "encoder for '{field}' has no fitted classes"
                )));
            }
        }
        Ok(())
    }
}
