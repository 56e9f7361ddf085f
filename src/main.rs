//! Carbonscope CLI
//!
//! Two subcommands sharing one artifact:
//! - `train` fits the regressor from a survey CSV and writes the artifact
//! - `serve` loads the artifact (if present) and runs the predictor service

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carbonscope_api::{ApiServer, ApiState, ServiceConfig};
use carbonscope_core::{train_from_csv, CarbonModel, DEFAULT_MODEL_PATH};
use carbonscope_storage::PredictionStore;

#[derive(Parser)]
#[command(name = "carbonscope", about = "Carbon-footprint estimation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the regression model from a survey dataset
    Train {
        /// Path to the survey CSV
        #[arg(long)]
        dataset: PathBuf,
        /// Where to write the model artifact
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
    /// Run the predictor service
    Serve {
        /// Model artifact to load at startup
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Train { dataset, model } => {
            let report = train_from_csv(&dataset, &model)?;
            info!(
                "Model trained on {} samples ({} features) and saved to '{}'",
                report.samples,
                report.feature_width,
                report.artifact_path.display()
            );
            Ok(())
        }
        Command::Serve { model } => serve(model).await,
    }
}

async fn serve(model_path: PathBuf) -> Result<()> {
    let config = ServiceConfig::from_env()?;

    // A missing artifact is an operating mode; a corrupt one is not.
    let model = if model_path.exists() {
        let model = CarbonModel::load(&model_path).map_err(|e| {
            anyhow::anyhow!("Failed to load model artifact '{}': {e}", model_path.display())
        })?;
        info!(
            "Loaded model artifact '{}' (schema width {})",
            model_path.display(),
            model.schema().width()
        );
        Some(model)
    } else {
        warn!(
            "Model artifact '{}' not found; /predict will report 'Model not found'",
            model_path.display()
        );
        None
    };

    let store = match &config.database_url {
        Some(url) => {
            let store = PredictionStore::open(url)?;
            let existing = store.count_predictions().await?;
            info!("Prediction store opened ({existing} existing records)");
            Some(store)
        }
        None => {
            info!("DATABASE_URL not set; predictions will not be persisted");
            None
        }
    };

    let state = Arc::new(ApiState { model, store });
    ApiServer::new(config, state).start().await
}
