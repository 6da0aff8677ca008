//! Axum HTTP API server for gesture classification.
//!
//! This crate provides:
//! - `POST /predict` over multipart form data
//! - Static gesture images under `/images`
//! - Health, readiness and Prometheus metrics endpoints
//! - Shared logging setup for the server and the live runner

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
