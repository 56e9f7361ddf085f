//! Fitted Model and Artifact
//!
//! This module wraps the random-forest regressor together with the feature
//! schema it was fitted on, and handles the versioned binary artifact the
//! predictor service loads at startup. The schema travels inside the
//! artifact so the encoded-column contract is validated instead of assumed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;
use tracing::{debug, info};

use crate::encoding::FeatureSchema;

/// Current artifact format version. Bumped on breaking layout changes.
pub const ARTIFACT_VERSION: u32 = 1;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model expects {expected} features, request supplies {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },
    #[error("unsupported model artifact version {0}")]
    UnsupportedVersion(u32),
    #[error("model artifact is malformed: {0}")]
    Malformed(String),
    #[error("training failed: {0}")]
    Training(String),
    #[error("prediction failed: {0}")]
    Prediction(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialized artifact layout.
#[derive(Deserialize)]
struct ModelArtifact {
    version: u32,
    schema: FeatureSchema,
    forest: Forest,
}

/// Borrowing twin of [`ModelArtifact`] so saving never copies the forest.
#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    version: u32,
    schema: &'a FeatureSchema,
    forest: &'a Forest,
}

/// A fitted carbon-emission regressor bound to its feature schema.
#[derive(Debug)]
pub struct CarbonModel {
    schema: FeatureSchema,
    forest: Forest,
}

impl CarbonModel {
    /// Fit a random-forest regressor with default hyperparameters.
    ///
    /// `matrix` rows must match the schema's width; one target per row.
    pub fn train(
        schema: FeatureSchema,
        matrix: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<Self, ModelError> {
        if matrix.is_empty() || targets.is_empty() {
            return Err(ModelError::Training(
                "features and targets cannot be empty".to_string(),
            ));
        }
        if matrix.len() != targets.len() {
            return Err(ModelError::Training(format!(
                "features and targets must have the same number of samples: {} vs {}",
                matrix.len(),
                targets.len()
            )));
        }
        if let Some(row) = matrix.iter().find(|row| row.len() != schema.width()) {
            return Err(ModelError::Training(format!(
                "feature row has {} columns, schema expects {}",
                row.len(),
                schema.width()
            )));
        }

        let x = DenseMatrix::from_2d_vec(&matrix.to_vec())
            .map_err(|e| ModelError::Training(e.to_string()))?;
        let y = targets.to_vec();

        let forest = RandomForestRegressor::fit(&x, &y, RandomForestRegressorParameters::default())
            .map_err(|e| ModelError::Training(e.to_string()))?;

        info!(
            "Trained random-forest regressor: {} samples, {} features",
            matrix.len(),
            schema.width()
        );

        Ok(CarbonModel { schema, forest })
    }

    /// The feature schema this model was fitted on.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Predict a single observation.
    ///
    /// The feature vector's width is validated against the schema before any
    /// computation; a mismatch is reported, never coerced.
    pub fn predict_one(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.schema.width() {
            return Err(ModelError::FeatureWidthMismatch {
                expected: self.schema.width(),
                actual: features.len(),
            });
        }

        let x = DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| ModelError::Prediction(e.to_string()))?;

        let predictions = self
            .forest
            .predict(&x)
            .map_err(|e| ModelError::Prediction(e.to_string()))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| ModelError::Prediction("empty prediction batch".to_string()))
    }

    /// Serialize the model and its schema to `path`, overwriting any prior
    /// artifact. The write goes through a temporary file so a failed run
    /// never leaves a truncated artifact behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();

        let artifact = ModelArtifactRef {
            version: ARTIFACT_VERSION,
            schema: &self.schema,
            forest: &self.forest,
        };
        let bytes =
            bincode::serialize(&artifact).map_err(|e| ModelError::Malformed(e.to_string()))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;

        info!(
            "Saved model artifact to '{}' ({} bytes, schema width {})",
            path.display(),
            bytes.len(),
            self.schema.width()
        );
        Ok(())
    }

    /// Deserialize an artifact, validating version and schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let artifact: ModelArtifact =
            bincode::deserialize(&bytes).map_err(|e| ModelError::Malformed(e.to_string()))?;

        if artifact.version != ARTIFACT_VERSION {
            return Err(ModelError::UnsupportedVersion(artifact.version));
        }
        if artifact.schema.width() == 0 {
            return Err(ModelError::Malformed(
                "artifact carries an empty feature schema".to_string(),
            ));
        }

        debug!(
            "Loaded model artifact from '{}' (schema width {})",
            path.display(),
            artifact.schema.width()
        );

        Ok(CarbonModel {
            schema: artifact.schema,
            forest: artifact.forest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodedColumn;

    fn numeric_schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema {
            columns: names
                .iter()
                .map(|name| EncodedColumn::Numeric {
                    source: name.to_string(),
                })
                .collect(),
        }
    }

    fn trained_model() -> CarbonModel {
        let schema = numeric_schema(&["a", "b"]);
        let matrix: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![i as f64, (30 - i) as f64])
            .collect();
        let targets: Vec<f64> = matrix.iter().map(|row| 3.0 * row[0] + row[1]).collect();
        CarbonModel::train(schema, &matrix, &targets).unwrap()
    }

    #[test]
    fn test_train_and_predict() {
        let model = trained_model();
        let prediction = model.predict_one(&[10.0, 20.0]).unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = trained_model();
        let err = model.predict_one(&[1.0, 2.0, 3.0]).unwrap_err();
        match err {
            ModelError::FeatureWidthMismatch { expected, actual } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_train_rejects_mismatched_samples() {
        let schema = numeric_schema(&["a"]);
        let err = CarbonModel::train(schema, &[vec![1.0], vec![2.0]], &[1.0]).unwrap_err();
        assert!(matches!(err, ModelError::Training(_)));
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carbon_model.bin");

        let model = trained_model();
        let before = model.predict_one(&[5.0, 5.0]).unwrap();
        model.save(&path).unwrap();

        let restored = CarbonModel::load(&path).unwrap();
        assert_eq!(restored.schema(), model.schema());
        let after = restored.predict_one(&[5.0, 5.0]).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_missing_artifact_is_io_error() {
        let err = CarbonModel::load("no_such_artifact.bin").unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        std::fs::write(&path, b"not an artifact").unwrap();

        let err = CarbonModel::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Malformed(_) | ModelError::UnsupportedVersion(_)
        ));
    }
}
