//! Subcommand implementations.

use anyhow::Context;
use peoplelens_core::analytics::{DatasetSummary, correlation_ranking};
use peoplelens_core::config::AppConfig;
use peoplelens_core::data::{CsvSource, DataSource, SurveyDataset};
use peoplelens_core::inference::{PredictionInput, Predictor};
use peoplelens_core::model::ModelArtifacts;
use peoplelens_core::training::train_from_csv;
use std::path::Path;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

pub async fn run_train(
    config: &AppConfig,
    data: &Path,
    out: &Path,
    estimators: Option<usize>,
    max_depth: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut training = config.training.clone();
    if let Some(n) = estimators {
        training.n_estimators = n;
    }
    if max_depth.is_some() {
        training.max_depth = max_depth;
    }
    if let Some(s) = seed {
        training.seed = s;
    }

    let outcome = train_from_csv(data, &training).await?;
    tracing::info!(
        accuracy = outcome.report.accuracy,
        macro_f1 = outcome.report.macro_f1,
        "training complete"
    );
    println!("{}", outcome.report);
    outcome.artifacts.save(out)?;
    println!(
        "saved model ({} trees, {} features) to {}",
        outcome.artifacts.model.n_trees(),
        outcome.artifacts.feature_columns.len(),
        out.display()
    );
    Ok(())
}

pub fn run_predict(config: &AppConfig, model_dir: &Path, input: &Path) -> anyhow::Result<()> {
    let artifacts = ModelArtifacts::load(model_dir)?;
    let predictor = Predictor::new(artifacts, config.inference.unseen_policy);

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let record: PredictionInput = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", input.display()))?;

    let label = predictor.predict(&record)?;
    println!("predicted job satisfaction: {label} (scale 1-5)");
    Ok(())
}

pub async fn run_report(data: &Path) -> anyhow::Result<()> {
    let batch = CsvSource::new(data).load(None).await?;
    let dataset = SurveyDataset::from_batch(&batch)?;

    let summary = DatasetSummary::compute(&dataset);
    println!("employees:           {}", summary.employees);
    println!("mean age:            {:.1}", summary.mean_age);
    println!("mean training hours: {:.1}", summary.mean_training_hours);
    println!();
    println!("correlation with job_satisfaction:");
    for entry in correlation_ranking(&dataset, 10) {
        println!("  {:<26} {:+.3}", entry.column, entry.r);
    }
    Ok(())
}
