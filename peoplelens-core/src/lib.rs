//! # peoplelens-core — employee survey analytics
//!
//! This crate holds everything behind the PeopleLens dashboard and CLI:
//! dataset loading and cleaning, the categorical encoding / feature-alignment
//! pipeline, class-balanced random-forest training, flat-file model
//! artifacts, single-record inference, and the aggregate computations that
//! back the dashboard charts.
//!
//! The one contract worth reading twice lives across [`encode`] and
//! [`features`]: category codes and the feature column order are frozen when
//! the model is trained and must be reproduced verbatim at inference time.

// Foundation
pub mod config;
pub mod error;

// Dataset loading, schema, cleaning, filtering
pub mod data;

// Train-time / inference-time encoding contract
pub mod encode;
pub mod features;

// Offline training pipeline
pub mod training;

// Flat model artifacts
pub mod model;

// Single-record prediction
pub mod inference;

// Dashboard aggregates
pub mod analytics;

// Re-exports
pub use config::AppConfig;
pub use error::AnalyticsError;
pub use inference::{PredictionInput, Predictor};
pub use model::ModelArtifacts;
