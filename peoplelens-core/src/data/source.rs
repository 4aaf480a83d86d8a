//! Data source abstraction for loading the survey dataset.
//!
//! The survey ships as a CSV export; JSONL is supported for fixtures and
//! ad-hoc extracts. Cells are parsed into typed JSON values at load time so
//! downstream parsing into [`crate::data::SurveyRecord`] works on numbers and
//! booleans, not strings.

use crate::data::schema::{SchemaDefinition, infer_schema};
use crate::error::AnalyticsError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A batch of data rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub total_rows: usize,
}

impl DataBatch {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            total_rows: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Information about a data source for logging and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub source_type: String,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub row_count: Option<usize>,
}

/// Trait for loading data from a source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load data from this source, optionally limiting the number of rows.
    async fn load(&self, limit: Option<usize>) -> Result<DataBatch, AnalyticsError>;

    /// Return metadata about this source.
    fn source_info(&self) -> DataSourceInfo;

    /// Infer or return the schema of this data source.
    fn schema(&self) -> Result<SchemaDefinition, AnalyticsError>;
}

/// Parse a raw CSV cell into the narrowest JSON value that fits.
fn parse_cell(raw: &str) -> serde_json::Value {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(s.to_string()));
    }
    match s {
        "true" | "True" | "TRUE" => serde_json::Value::Bool(true),
        "false" | "False" | "FALSE" => serde_json::Value::Bool(false),
        _ => serde_json::Value::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CsvSource
// ---------------------------------------------------------------------------

/// CSV file data source.
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: default_delimiter(),
        }
    }

    fn parse(&self, content: &str, limit: Option<usize>) -> Result<DataBatch, AnalyticsError> {
        let mut lines = content.lines();

        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| AnalyticsError::dataset("Empty CSV file"))?
            .split(self.delimiter)
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(max) = limit {
                if rows.len() >= max {
                    break;
                }
            }
            let row: Vec<serde_json::Value> = line.split(self.delimiter).map(parse_cell).collect();
            if row.len() != columns.len() {
                return Err(AnalyticsError::dataset(format!(
                    "CSV row has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        let total_rows = rows.len();
        Ok(DataBatch {
            columns,
            rows,
            total_rows,
        })
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn load(&self, limit: Option<usize>) -> Result<DataBatch, AnalyticsError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AnalyticsError::dataset(format!("failed to read {}: {e}", self.path.display()))
        })?;
        self.parse(&content, limit)
    }

    fn source_info(&self) -> DataSourceInfo {
        DataSourceInfo {
            source_type: "csv".to_string(),
            location: self.path.display().to_string(),
            accessed_at: chrono::Utc::now(),
            row_count: None,
        }
    }

    fn schema(&self) -> Result<SchemaDefinition, AnalyticsError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AnalyticsError::dataset(format!("Failed to read CSV for schema: {e}")))?;
        // Sample up to 100 rows for type inference
        let batch = self.parse(&content, Some(100))?;
        Ok(infer_schema(&batch.columns, &batch.rows))
    }
}

// ---------------------------------------------------------------------------
// JsonlSource
// ---------------------------------------------------------------------------

/// JSON Lines (JSONL) file data source — one JSON object per line.
pub struct JsonlSource {
    pub path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn to_batch(items: Vec<serde_json::Value>) -> DataBatch {
        let columns: Vec<String> = if let Some(serde_json::Value::Object(map)) = items.first() {
            map.keys().cloned().collect()
        } else {
            return DataBatch::empty();
        };

        let rows: Vec<Vec<serde_json::Value>> = items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|col| item.get(col).cloned().unwrap_or(serde_json::Value::Null))
                    .collect()
            })
            .collect();

        let total_rows = rows.len();
        DataBatch {
            columns,
            rows,
            total_rows,
        }
    }
}

#[async_trait]
impl DataSource for JsonlSource {
    async fn load(&self, limit: Option<usize>) -> Result<DataBatch, AnalyticsError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AnalyticsError::dataset(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let mut items = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(max) = limit {
                if items.len() >= max {
                    break;
                }
            }
            let value: serde_json::Value = serde_json::from_str(line)?;
            items.push(value);
        }
        Ok(Self::to_batch(items))
    }

    fn source_info(&self) -> DataSourceInfo {
        DataSourceInfo {
            source_type: "jsonl".to_string(),
            location: self.path.display().to_string(),
            accessed_at: chrono::Utc::now(),
            row_count: None,
        }
    }

    fn schema(&self) -> Result<SchemaDefinition, AnalyticsError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AnalyticsError::dataset(format!("Failed to read JSONL for schema: {e}")))?;
        let mut items = Vec::new();
        for line in content.lines().take(100) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                items.push(value);
            }
        }
        let batch = Self::to_batch(items);
        Ok(infer_schema(&batch.columns, &batch.rows))
    }
}
