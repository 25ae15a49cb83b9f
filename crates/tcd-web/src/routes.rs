//! Route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{analyze, health, pages};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// HTML pages and their assets
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(pages::index))
        .route("/analyze", post(pages::analyze_form))
        .route("/static/style.css", get(pages::stylesheet))
}

/// API v1 routes, mounted under `/api/v1`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(analyze::analyze_handler))
        .route("/split", post(analyze::split_handler))
}

/// Health checks and service metrics
pub fn ops_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
}
