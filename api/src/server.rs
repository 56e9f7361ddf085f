//! API Server
//!
//! This module contains the router and server setup for the predictor
//! service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServiceConfig;
use crate::handlers::{health_check, list_predictions, predict, ApiState};

/// Build the application router over shared state.
///
/// Split out of [`ApiServer`] so tests can drive the routes without a
/// listener.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/predictions", get(list_predictions))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ServiceConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ServiceConfig, state: Arc<ApiState>) -> Self {
        Self { config, state }
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting carbonscope API server on {}:{}",
            self.config.host, self.config.port
        );

        let app = router(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address: {e}"))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("carbonscope API server listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {e}"))?;

        Ok(())
    }
}
