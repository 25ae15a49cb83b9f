//! Metrics tracking middleware
//!
//! Tracks request latency, counts, and status codes per endpoint
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Endpoints recorded by name; anything else is grouped together
const KNOWN_ENDPOINTS: [&str; 9] = [
    "/",
    "/analyze",
    "/api/v1/analyze",
    "/api/v1/split",
    "/health",
    "/ready",
    "/metrics",
    "/api-docs/openapi.json",
    "/static/style.css",
];

/// Metrics tracking middleware
///
/// Records:
/// - Total request count
/// - Request count and latency per endpoint
/// - Response status codes
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let endpoint = normalize_endpoint(request.uri().path());
    state.increment_requests();

    let response = next.run(request).await;

    let latency_us = start.elapsed().as_micros() as u64;
    state
        .record_request(endpoint, response.status().as_u16(), latency_us)
        .await;

    response
}

/// Map a request path to its metrics key
///
/// Unknown paths share one key so that probing random URLs cannot grow the
/// metrics table without bound.
fn normalize_endpoint(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    if KNOWN_ENDPOINTS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}
