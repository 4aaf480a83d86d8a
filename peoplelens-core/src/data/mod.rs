//! Dataset loading, schema inference, cleaning, and dashboard filtering.

pub mod filter;
pub mod schema;
pub mod source;
pub mod survey;

pub use filter::DashboardFilter;
pub use schema::{ColumnSchema, ColumnType, SchemaDefinition, infer_schema};
pub use source::{CsvSource, DataBatch, DataSource, JsonlSource};
pub use survey::{SurveyDataset, SurveyRecord};
