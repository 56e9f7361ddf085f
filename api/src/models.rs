//! API Wire Types
//!
//! Request and response bodies for the predictor service.

use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
///
/// Every field is optional on the wire and defaults to 0. Unknown fields
/// are accepted and preserved in the persisted record, but only the seven
/// recognized ones feed the model.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredictRequest {
    pub car_km_week: f64,
    pub flight_hours: f64,
    pub bike_km_week: f64,
    pub electricity_kwh: f64,
    pub gas_usage: f64,
    pub diet_type: f64,
    pub monthly_spend: f64,
}

impl PredictRequest {
    /// The observation in its fixed encoding order.
    pub fn feature_vector(&self) -> Vec<f64> {
        vec![
            self.car_km_week,
            self.flight_hours,
            self.bike_km_week,
            self.electricity_kwh,
            self.gas_usage,
            self.diet_type,
            self.monthly_spend,
        ]
    }
}

/// Body of a successful `POST /predict` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictResponse {
    pub carbon_footprint: f64,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
