//! API Handlers
//!
//! This module contains the request handlers for the predictor service and
//! the shared state they run against.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde_json::Value;
use tracing::debug;

use carbonscope_core::{CarbonModel, ModelError};
use carbonscope_storage::{PredictionRecord, PredictionStore};

use crate::error::ApiError;
use crate::models::{PredictRequest, PredictResponse};

/// Shared service state, built once at startup and passed into handlers.
///
/// Both members are optional: a missing model artifact and an unconfigured
/// store are operating modes, surfaced per-request instead of at startup.
pub struct ApiState {
    /// Fitted model loaded from the artifact, if any
    pub model: Option<CarbonModel>,
    /// Prediction store, if configured
    pub store: Option<PredictionStore>,
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "carbonscope-api",
    }))
}

/// Compute a prediction for one observation, persisting the pair when a
/// store is available.
pub async fn predict(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    // Keep the raw body: the persisted record carries the caller's exact
    // input, recognized fields or not.
    let Json(raw) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let request: PredictRequest = serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::InvalidRequest(format!("invalid request body: {e}")))?;

    let model = state.model.as_ref().ok_or(ApiError::ModelNotFound)?;

    let features = request.feature_vector();
    let prediction = model.predict_one(&features).map_err(|e| match e {
        ModelError::FeatureWidthMismatch { expected, actual } => {
            ApiError::SchemaMismatch { expected, actual }
        }
        other => ApiError::Internal(anyhow::Error::new(other)),
    })?;

    if let Some(store) = &state.store {
        let record = PredictionRecord {
            input: raw,
            carbon_footprint: prediction,
        };
        store
            .insert_prediction(&record)
            .await
            .map_err(ApiError::Internal)?;
    }

    debug!("Prediction served: {prediction}");

    Ok(Json(PredictResponse {
        carbon_footprint: prediction,
    }))
}

/// List every persisted prediction record.
pub async fn list_predictions(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<PredictionRecord>>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::DatabaseNotConnected)?;

    let records = store
        .list_predictions()
        .await
        .map_err(ApiError::Internal)?;

    debug!("Listing {} prediction records", records.len());
    Ok(Json(records))
}
