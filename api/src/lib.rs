//! Carbonscope API
//!
//! This crate contains the HTTP surface of the predictor service: the
//! request handlers, wire types, structured error responses, and the
//! server setup around them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use handlers::ApiState;
pub use server::{router, ApiServer};
