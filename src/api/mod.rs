//! HTTP API for the chunking service.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub use error::ApiError;
pub use handlers::AppState;

/// Build the service routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/config", get(handlers::get_config))
        .route("/chunk", post(handlers::chunk))
        .route("/index", post(handlers::index))
        .route("/keywords", post(handlers::keywords))
        .with_state(state)
}
