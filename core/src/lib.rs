//! Carbonscope Core
//!
//! This crate contains the offline training pipeline and the fitted model
//! used by the predictor service: CSV dataset loading, the feature schema
//! with one-hot encoding, the random-forest regressor wrapper, and the
//! versioned model artifact.

pub mod dataset;
pub mod encoding;
pub mod model;
pub mod trainer;

pub use dataset::{load_csv, Dataset, FEATURE_COLUMNS, TARGET_COLUMN};
pub use encoding::{EncodedColumn, FeatureSchema};
pub use model::{CarbonModel, ModelError, ARTIFACT_VERSION};
pub use trainer::{train_from_csv, TrainingReport, DEFAULT_MODEL_PATH};
