//! Service Configuration
//!
//! Environment-driven configuration for the predictor service. Absence of
//! `DATABASE_URL` is a legitimate operating mode: predictions are still
//! computed, just not persisted.

use anyhow::Result;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Prediction store location; `None` disables persistence
    pub database_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the environment.
    ///
    /// `PORT` defaults to 5000; a value that is not a valid port number is
    /// a startup error, not a silent fallback.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("Invalid PORT value '{raw}'"))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            host: "0.0.0.0".to_string(),
            port,
            database_url,
        })
    }
}
