//! PeopleLens CLI — offline training, prediction, and dataset reporting.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// PeopleLens: employee satisfaction analytics
#[derive(Parser, Debug)]
#[command(name = "peoplelens", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Train the satisfaction model and save artifacts
    Train {
        /// Survey CSV to train on
        #[arg(short, long)]
        data: PathBuf,
        /// Directory to write the three artifact files
        #[arg(short, long, default_value = "models")]
        out: PathBuf,
        /// Number of trees in the forest
        #[arg(long)]
        estimators: Option<usize>,
        /// Maximum tree depth
        #[arg(long)]
        max_depth: Option<usize>,
        /// RNG seed for oversampling, splitting, and bootstrapping
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Predict satisfaction for one record from a JSON file
    Predict {
        /// Directory holding the trained artifacts
        #[arg(short, long, default_value = "models")]
        model_dir: PathBuf,
        /// JSON file with the prediction input
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print dataset summary and correlation ranking
    Report {
        /// Survey CSV to analyze
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "peoplelens", "peoplelens")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "peoplelens.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Train {
            data,
            out,
            estimators,
            max_depth,
            seed,
        } => commands::run_train(&config, &data, &out, estimators, max_depth, seed).await,
        Commands::Predict { model_dir, input } => {
            commands::run_predict(&config, &model_dir, &input)
        }
        Commands::Report { data } => commands::run_report(&data).await,
    }
}
