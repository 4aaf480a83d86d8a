//! End-to-end training: dataset to artifacts plus an evaluation report.

use crate::config::TrainingConfig;
use crate::data::source::{CsvSource, DataSource};
use crate::data::survey::{CATEGORICAL_COLUMNS, SurveyDataset};
use crate::encode::{EncoderSet, UnseenPolicy};
use crate::error::AnalyticsError;
use crate::features::FeatureColumns;
use crate::model::ModelArtifacts;
use crate::training::forest::{ForestConfig, RandomForest};
use crate::training::metrics::ClassificationReport;
use crate::training::oversample::oversample;
use crate::training::split::stratified_split;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ModelArtifacts,
    pub report: ClassificationReport,
}

/// Load a survey CSV, clean it, and run the training pipeline.
pub async fn train_from_csv(
    path: &Path,
    config: &TrainingConfig,
) -> Result<TrainingOutcome, AnalyticsError> {
    let source = CsvSource::new(path);
    let batch = source.load(None).await?;
    tracing::info!(rows = batch.row_count(), path = %path.display(), "loaded dataset");
    let dataset = SurveyDataset::from_batch(&batch)?;
    train(&dataset, config)
}

/// Run the full pipeline on a cleaned dataset: fit encoders, build the
/// matrix, balance classes, split, fit the forest, evaluate held-out rows.
pub fn train(
    dataset: &SurveyDataset,
    config: &TrainingConfig,
) -> Result<TrainingOutcome, AnalyticsError> {
    if dataset.is_empty() {
        return Err(AnalyticsError::training("dataset has no usable rows"));
    }

    let encoders = EncoderSet::fit(dataset);
    let feature_columns = FeatureColumns::canonical();
    let (features, labels) = build_matrix(dataset, &encoders, &feature_columns)?;
    tracing::info!(
        rows = features.len(),
        features = feature_columns.len(),
        "built feature matrix"
    );

    let (balanced_x, balanced_y) = oversample(
        &features,
        &labels,
        config.oversample_neighbors,
        config.seed,
    )?;
    tracing::info!(
        before = features.len(),
        after = balanced_x.len(),
        "balanced classes"
    );

    let split = stratified_split(&balanced_x, &balanced_y, config.test_fraction, config.seed)?;

    let forest_config = ForestConfig {
        n_estimators: config.n_estimators,
        max_depth: config.max_depth,
        min_samples_split: 2,
        seed: config.seed,
    };
    let model = RandomForest::fit(&split.x_train, &split.y_train, &forest_config)?;

    let predicted = model.predict_batch(&split.x_test)?;
    let report = ClassificationReport::from_predictions(&split.y_test, &predicted);
    tracing::info!(
        accuracy = report.accuracy,
        macro_f1 = report.macro_f1,
        test_rows = report.total,
        "evaluated on held-out set"
    );

    Ok(TrainingOutcome {
        artifacts: ModelArtifacts {
            model,
            feature_columns,
            encoders,
            trained_at: chrono::Utc::now(),
            dataset_rows: dataset.len(),
        },
        report,
    })
}

/// Encode every record into an aligned feature vector; labels come from the
/// target column. Training always encodes under `Reject` — the encoders were
/// fitted on this very data, so an unseen value here is a bug.
pub fn build_matrix(
    dataset: &SurveyDataset,
    encoders: &EncoderSet,
    feature_columns: &FeatureColumns,
) -> Result<(Vec<Vec<f64>>, Vec<i64>), AnalyticsError> {
    let mut features = Vec::with_capacity(dataset.len());
    let mut labels = Vec::with_capacity(dataset.len());

    for record in dataset.records() {
        let mut values: BTreeMap<String, f64> = BTreeMap::new();
        for column in feature_columns.names() {
            let value = if CATEGORICAL_COLUMNS.contains(&column.as_str()) {
                let raw = record.categorical_value(column).ok_or_else(|| {
                    AnalyticsError::Encoding(format!("record is missing field '{column}'"))
                })?;
                encoders.encode(column, &raw, UnseenPolicy::Reject)? as f64
            } else {
                record.numeric_value(column).ok_or_else(|| {
                    AnalyticsError::Encoding(format!("record is missing field '{column}'"))
                })?
            };
            values.insert(column.clone(), value);
        }
        features.push(feature_columns.align(&values));
        labels.push(record.job_satisfaction);
    }

    Ok((features, labels))
}
