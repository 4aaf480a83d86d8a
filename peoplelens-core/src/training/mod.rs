//! Offline training pipeline: class balancing, splitting, forest fitting,
//! and evaluation.

pub mod forest;
pub mod metrics;
pub mod oversample;
pub mod pipeline;
pub mod split;

pub use forest::{ForestConfig, RandomForest};
pub use metrics::ClassificationReport;
pub use pipeline::{TrainingOutcome, train, train_from_csv};
