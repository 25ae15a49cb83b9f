//! TCD Web - HTML front-end and JSON API
//!
//! Serves the analysis form, a JSON API over the same classifier,
//! health checks and an OpenAPI document.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;

use crate::error::ApiError;
use crate::handlers::analyze::{
    AnalyzeResponse, ClauseDto, SentenceDto, SplitResponse, TextRequest,
};
use crate::handlers::health::{HealthResponse, ReadinessResponse};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI document for the JSON API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Transitivity Clause Detector API",
        description = "Classifies the verbs of each sentence as transitive or intransitive"
    ),
    paths(
        handlers::analyze::analyze_handler,
        handlers::analyze::split_handler,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        TextRequest,
        AnalyzeResponse,
        SentenceDto,
        ClauseDto,
        SplitResponse,
        ApiError,
        HealthResponse,
        ReadinessResponse,
    )),
    tags(
        (name = "analysis", description = "Transitivity analysis"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// CORS for the JSON API; no cross-origin access unless origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = routes::api_routes().layer(cors_layer(&state.config.server.cors_origins));

    Router::new()
        .merge(routes::page_routes())
        .merge(routes::ops_routes())
        .nest("/api/v1", api)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::security_headers_middleware))
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware::metrics_middleware,
                ))
                .layer(DefaultBodyLimit::max(state.config.server.max_body_size)),
        )
        .with_state(state)
}
