//! Offline Training Pipeline
//!
//! Runs the whole fit: load the survey CSV, derive the feature schema,
//! build the design matrix, fit the forest, write the artifact. Run once,
//! offline; any failure aborts with an error and leaves no partial
//! artifact behind.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::dataset::{load_csv, FEATURE_COLUMNS, TARGET_COLUMN};
use crate::encoding::FeatureSchema;
use crate::model::CarbonModel;

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "carbon_model.bin";

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub feature_width: usize,
    pub artifact_path: PathBuf,
}

/// Train a model from a CSV dataset and persist the artifact.
pub fn train_from_csv<P, Q>(dataset_path: P, artifact_path: Q) -> Result<TrainingReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let dataset_path = dataset_path.as_ref();
    let artifact_path = artifact_path.as_ref();

    let dataset = load_csv(dataset_path)?;

    let mut expected: Vec<&str> = FEATURE_COLUMNS.to_vec();
    expected.push(TARGET_COLUMN);
    dataset.require_columns(&expected)?;

    let schema = FeatureSchema::fit(&dataset, &FEATURE_COLUMNS)?;
    let matrix = schema.transform(&dataset)?;
    let targets = dataset.numeric_column(TARGET_COLUMN)?;

    let model = CarbonModel::train(schema, &matrix, &targets)
        .map_err(|e| anyhow::anyhow!("Failed to train model: {e}"))?;
    model
        .save(artifact_path)
        .map_err(|e| anyhow::anyhow!("Failed to save model artifact: {e}"))?;

    let report = TrainingReport {
        samples: dataset.len(),
        feature_width: model.schema().width(),
        artifact_path: artifact_path.to_path_buf(),
    };

    info!(
        "Training complete: {} samples, {} encoded features, artifact at '{}'",
        report.samples,
        report.feature_width,
        report.artifact_path.display()
    );

    Ok(report)
}
