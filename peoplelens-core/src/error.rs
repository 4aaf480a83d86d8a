//! Error types for the peoplelens-core crate.

use thiserror::Error;

/// Top-level error type for analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unseen category {value:?} for field '{field}'")]
    UnseenCategory { field: String, value: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn unseen(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnseenCategory {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
