//! Configuration types for PeopleLens.
//!
//! Every knob has a serde default so a partial TOML file (or none at all)
//! yields a runnable configuration.

use crate::encode::UnseenPolicy;
use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dataset location and cleaning settings.
    #[serde(default)]
    pub data: DataConfig,
    /// Training pipeline settings.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Model artifact storage.
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    /// Inference policy settings.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Dashboard HTTP server settings.
    #[serde(default)]
    pub serving: ServingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, AnalyticsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| AnalyticsError::config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the survey CSV export.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/employee_survey.csv")
}

/// Training pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of trees in the forest.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// Maximum tree depth (unbounded if not set).
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Fraction of rows held out for evaluation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Neighbors considered when synthesizing minority-class rows.
    #[serde(default = "default_oversample_neighbors")]
    pub oversample_neighbors: usize,
    /// RNG seed for oversampling, splitting, and bootstrap sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: None,
            test_fraction: default_test_fraction(),
            oversample_neighbors: default_oversample_neighbors(),
            seed: default_seed(),
        }
    }
}

fn default_n_estimators() -> usize {
    100
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_oversample_neighbors() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

/// Model artifact storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding the three artifact files.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

/// Inference configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// How to handle a categorical value never seen during training.
    #[serde(default)]
    pub unseen_policy: UnseenPolicy,
}

/// Dashboard HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.training.n_estimators, 100);
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.serving.port, 8080);
        assert_eq!(config.inference.unseen_policy, UnseenPolicy::Reject);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [training]
            n_estimators = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.training.n_estimators, 10);
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.artifacts.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.training.n_estimators, config.training.n_estimators);
        assert_eq!(parsed.serving.host, config.serving.host);
    }
}
