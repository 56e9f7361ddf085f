//! Structured API Errors
//!
//! Every failure surfaces as `{"error": <message>}` with a matching HTTP
//! status: 400 for malformed input, 500 for everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No model artifact was present at startup
    #[error("Model not found")]
    ModelNotFound,
    /// No prediction store is configured
    #[error("Database not connected")]
    DatabaseNotConnected,
    /// The request body could not be parsed into a prediction request
    #[error("{0}")]
    InvalidRequest(String),
    /// The loaded model was fitted on a different feature layout
    #[error("feature schema mismatch: model expects {expected} features, request supplies {actual}")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_match_wire_contract() {
        assert_eq!(ApiError::ModelNotFound.to_string(), "Model not found");
        assert_eq!(
            ApiError::DatabaseNotConnected.to_string(),
            "Database not connected"
        );
        assert_eq!(
            ApiError::SchemaMismatch {
                expected: 57,
                actual: 7
            }
            .to_string(),
            "feature schema mismatch: model expects 57 features, request supplies 7"
        );
    }

    #[test]
    fn test_invalid_request_is_client_error() {
        assert_eq!(
            ApiError::InvalidRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ModelNotFound.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
