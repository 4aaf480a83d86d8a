//! Flat-file model artifacts.
//!
//! Training writes three JSON files into a model directory and inference
//! reads them back: the fitted forest, the feature column order, and the
//! per-column encoder set. The save/load round trip must preserve encoder
//! codes and column order exactly; everything downstream leans on that.

use crate::encode::EncoderSet;
use crate::error::AnalyticsError;
use crate::features::FeatureColumns;
use crate::training::forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MODEL_FILE: &str = "model.json";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";

/// The three training artifacts plus provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub model: RandomForest,
    pub feature_columns: FeatureColumns,
    pub encoders: EncoderSet,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub dataset_rows: usize,
}

/// On-disk shape of `model.json`: the forest plus its provenance.
#[derive(Debug, Serialize, Deserialize)]
struct StoredModel {
    model: RandomForest,
    trained_at: chrono::DateTime<chrono::Utc>,
    dataset_rows: usize,
}

impl ModelArtifacts {
    /// Write the three artifact files, creating the directory if needed.
    pub fn save(&self, dir: &Path) -> Result<(), AnalyticsError> {
        std::fs::create_dir_all(dir)?;
        let stored = StoredModel {
            model: self.model.clone(),
            trained_at: self.trained_at,
            dataset_rows: self.dataset_rows,
        };
        write_json(&dir.join(MODEL_FILE), &stored)?;
        write_json(&dir.join(FEATURE_COLUMNS_FILE), &self.feature_columns)?;
        write_json(&dir.join(ENCODERS_FILE), &self.encoders)?;
        tracing::info!(dir = %dir.display(), "saved model artifacts");
        Ok(())
    }

    /// Load all three artifacts. Any missing or corrupt file is fatal.
    pub fn load(dir: &Path) -> Result<Self, AnalyticsError> {
        let stored: StoredModel = read_json(&dir.join(MODEL_FILE))?;
        let feature_columns: FeatureColumns = read_json(&dir.join(FEATURE_COLUMNS_FILE))?;
        let encoders: EncoderSet = read_json(&dir.join(ENCODERS_FILE))?;

        if feature_columns.len() != stored.model.n_features() {
            return Err(AnalyticsError::model(format!(
                "feature column list has {} entries but model expects {}",
                feature_columns.len(),
                stored.model.n_features()
            )));
        }

        tracing::info!(
            dir = %dir.display(),
            features = feature_columns.len(),
            trees = stored.model.n_trees(),
            "loaded model artifacts"
        );
        Ok(Self {
            model: stored.model,
            feature_columns,
            encoders,
            trained_at: stored.trained_at,
            dataset_rows: stored.dataset_rows,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AnalyticsError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .map_err(|e| AnalyticsError::model(format!("failed to write {}: {e}", path.display())))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AnalyticsError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AnalyticsError::model(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| AnalyticsError::model(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::survey::SurveyDataset;
    use crate::data::survey::fixtures::record;
    use crate::training::forest::ForestConfig;

    fn artifacts() -> ModelArtifacts {
        let dataset = SurveyDataset::new(vec![
            record("a", "Engineering", 30.0, 3),
            record("b", "Sales", 40.0, 4),
        ]);
        let feature_columns = FeatureColumns::new(vec!["x".into(), "y".into()]);
        let x = vec![vec![1.0, 0.0], vec![2.0, 1.0], vec![8.0, 0.5], vec![9.0, 1.5]];
        let y = vec![3, 3, 4, 4];
        let model = RandomForest::fit(&x, &y, &ForestConfig {
            n_estimators: 3,
            ..Default::default()
        })
        .unwrap();
        ModelArtifacts {
            model,
            feature_columns,
            encoders: EncoderSet::fit(&dataset),
            trained_at: chrono::Utc::now(),
            dataset_rows: dataset.len(),
        }
    }

    #[test]
    fn test_save_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        artifacts().save(dir.path()).unwrap();
        assert!(dir.path().join(MODEL_FILE).exists());
        assert!(dir.path().join(FEATURE_COLUMNS_FILE).exists());
        assert!(dir.path().join(ENCODERS_FILE).exists());
    }

    #[test]
    fn test_roundtrip_preserves_codes_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let original = artifacts();
        original.save(dir.path()).unwrap();
        let loaded = ModelArtifacts::load(dir.path()).unwrap();
        assert_eq!(loaded.feature_columns, original.feature_columns);
        assert_eq!(loaded.encoders, original.encoders);
        assert_eq!(
            loaded.encoders.dept.code("Sales"),
            original.encoders.dept.code("Sales")
        );
        assert_eq!(loaded.dataset_rows, original.dataset_rows);
    }

    #[test]
    fn test_load_missing_dir_is_fatal() {
        let err = ModelArtifacts::load(Path::new("/nonexistent/models")).unwrap_err();
        assert!(matches!(err, AnalyticsError::Model(_)));
    }

    #[test]
    fn test_load_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        artifacts().save(dir.path()).unwrap();
        std::fs::write(dir.path().join(ENCODERS_FILE), "{ not json").unwrap();
        assert!(ModelArtifacts::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_rejects_mismatched_feature_count() {
        let dir = tempfile::tempdir().unwrap();
        let original = artifacts();
        original.save(dir.path()).unwrap();
        let truncated = FeatureColumns::new(vec!["x".into()]);
        std::fs::write(
            dir.path().join(FEATURE_COLUMNS_FILE),
            serde_json::to_string(&truncated).unwrap(),
        )
        .unwrap();
        assert!(ModelArtifacts::load(dir.path()).is_err());
    }
}
