//! PeopleLens dashboard server.
//!
//! Loads the dataset and model artifacts once, validates the encoders
//! against the dataset schema, and serves the two-page UI.

use anyhow::Context;
use clap::Parser;
use peoplelens_core::config::AppConfig;
use peoplelens_core::data::{CsvSource, DataSource, SurveyDataset};
use peoplelens_core::inference::Predictor;
use peoplelens_core::model::ModelArtifacts;
use peoplelens_ui::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// PeopleLens dashboard server
#[derive(Parser, Debug)]
#[command(name = "peoplelens-ui", version, about, long_about = None)]
struct Cli {
    /// Survey CSV backing the dashboard
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Directory holding the trained artifacts
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override, e.g. 0.0.0.0:9000
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let data_path = cli.data.unwrap_or_else(|| config.data.dataset_path.clone());
    let model_dir = cli
        .model_dir
        .unwrap_or_else(|| config.artifacts.model_dir.clone());

    let source = CsvSource::new(&data_path);
    let batch = source
        .load(None)
        .await
        .with_context(|| format!("loading dataset {}", data_path.display()))?;
    let dataset = SurveyDataset::from_batch(&batch)?;
    tracing::info!(rows = dataset.len(), path = %data_path.display(), "dataset ready");

    let artifacts = ModelArtifacts::load(&model_dir)
        .with_context(|| format!("loading artifacts from {}", model_dir.display()))?;
    artifacts
        .encoders
        .validate_schema(&source.schema()?)
        .context("encoder set does not match the dataset schema")?;
    let predictor = Predictor::new(artifacts, config.inference.unseen_policy);

    let state = Arc::new(AppState { dataset, predictor });
    let app = peoplelens_ui::router(state);

    let bind = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.serving.host, config.serving.port));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(addr = %bind, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}
