//! API Integration Tests
//!
//! Drives the full router against the pre-parsed fixture annotator, so no
//! network access or language model is needed.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tcd_annotator::ConlluAnnotator;
use tcd_core::config::AppConfig;
use tcd_web::{create_router, state::AppState};
use tower::ServiceExt;

const FIXTURE: &str = include_str!("fixtures/sentences.conllu");

/// Router with a provisioned fixture annotator
fn ready_app() -> (Router, Arc<AppState>) {
    let annotator = Arc::new(ConlluAnnotator::from_conllu(FIXTURE).unwrap());
    let state = Arc::new(AppState::with_annotator(AppConfig::default(), annotator));
    (create_router(state.clone()), state)
}

/// Ready router that allows the given CORS origins on the API
fn app_with_origins(origins: &[&str]) -> Router {
    let mut config = AppConfig::default();
    config.server.cors_origins = origins.iter().map(|o| o.to_string()).collect();
    let annotator = Arc::new(ConlluAnnotator::from_conllu(FIXTURE).unwrap());
    create_router(Arc::new(AppState::with_annotator(config, annotator)))
}

/// Router whose annotator failed to provision
fn unready_app() -> Router {
    create_router(Arc::new(AppState::new(AppConfig::default())))
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn create_form_request(text: &str) -> Request<Body> {
    let body = format!("text={}", text.replace(' ', "+"));
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn analyze_from_origin(origin: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("Content-Type", "application/json")
        .header(header::ORIGIN, origin)
        .body(Body::from(json!({ "text": "Red sky" }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let response = unready_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_with_annotator() {
    let (app, _) = ready_app();
    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["model"], "inline");
}

#[tokio::test]
async fn test_readiness_without_annotator() {
    let response = unready_app().oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["ready"], false);
    assert!(json["model"].is_null());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, state) = ready_app();
    let request = create_json_request(
        "POST",
        "/api/v1/analyze",
        Some(json!({ "text": "The cat sleeps." })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["uptime_seconds"].is_number());
    assert_eq!(json["total_requests"], 2);
    assert_eq!(json["analyses"], 1);
    assert_eq!(state.get_analysis_count(), 1);
}

// =============================================================================
// Analysis API Tests
// =============================================================================

#[tokio::test]
async fn test_analyze_transitive_and_intransitive() {
    let (app, _) = ready_app();
    let request = create_json_request(
        "POST",
        "/api/v1/analyze",
        Some(json!({ "text": "The cat eats fish. The cat sleeps." })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let sentences = json["sentences"].as_array().unwrap();
    assert_eq!(sentences.len(), 2);

    assert_eq!(sentences[0]["sentence"], "The cat eats fish");
    assert_eq!(sentences[0]["clauses"][0]["verb"], "eats");
    assert_eq!(sentences[0]["clauses"][0]["direct_object"], "fish");
    assert_eq!(sentences[0]["clauses"][0]["clause_type"], "Transitive");

    assert_eq!(sentences[1]["sentence"], "The cat sleeps");
    assert_eq!(sentences[1]["clauses"][0]["verb"], "sleeps");
    assert!(sentences[1]["clauses"][0]["direct_object"].is_null());
    assert_eq!(sentences[1]["clauses"][0]["clause_type"], "Intransitive");

    assert!(json["processing_time_ms"].is_number());
}

#[tokio::test]
async fn test_analyze_no_verbs() {
    let (app, _) = ready_app();
    let request = create_json_request("POST", "/api/v1/analyze", Some(json!({ "text": "Red sky" })));

    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["sentences"][0]["sentence"], "Red sky");
    assert!(json["sentences"][0]["clauses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_blank_text_is_noop() {
    // Even without an annotator, blank input is not an error
    let request = create_json_request("POST", "/api/v1/analyze", Some(json!({ "text": "  . " })));
    let response = unready_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["sentences"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_periods_only_is_noop() {
    let request = create_json_request("POST", "/api/v1/analyze", Some(json!({ "text": " ... " })));
    let response = unready_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["sentences"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_without_annotator() {
    let request = create_json_request(
        "POST",
        "/api/v1/analyze",
        Some(json!({ "text": "The cat sleeps." })),
    );
    let response = unready_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ANNOTATOR_UNAVAILABLE");
}

#[tokio::test]
async fn test_analyze_annotator_failure() {
    let (app, state) = ready_app();
    let request = create_json_request(
        "POST",
        "/api/v1/analyze",
        Some(json!({ "text": "The cat eats fish. Dogs bark." })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ANNOTATOR_ERROR");
    assert_eq!(state.get_analysis_count(), 0);
}

#[tokio::test]
async fn test_analyze_invalid_json() {
    let (app, _) = ready_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("Content-Type", "application/json")
        .body(Body::from("{invalid json}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_split() {
    let request = create_json_request(
        "POST",
        "/api/v1/split",
        Some(json!({ "text": "The cat eats fish. The cat sleeps.  " })),
    );
    let response = unready_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["fragments"], json!(["The cat eats fish", "The cat sleeps"]));
}

// =============================================================================
// HTML Page Tests
// =============================================================================

#[tokio::test]
async fn test_index_page() {
    let (app, _) = ready_app();
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(response.headers().get(header::CONTENT_SECURITY_POLICY).is_some());

    let html = body_text(response).await;
    assert!(html.contains("Transitivity Clause Detector"));
    assert!(html.contains("Enter text (one or more sentences):"));
    assert!(html.contains(">Analyze</button>"));
}

#[tokio::test]
async fn test_form_analysis() {
    let (app, _) = ready_app();
    let response = app
        .oneshot(create_form_request("The cat eats fish. Red sky."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Sentence: The cat eats fish"));
    assert!(html.contains("<code>fish</code>"));
    assert!(html.contains("Sentence: Red sky"));
    assert!(html.contains("No verbs detected."));
    assert_eq!(html.matches("<hr>").count(), 2);
}

#[tokio::test]
async fn test_form_blank_input() {
    let (app, state) = ready_app();
    let response = app.oneshot(create_form_request("   ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("Sentence:"));
    assert_eq!(state.get_analysis_count(), 0);
}

#[tokio::test]
async fn test_form_periods_only_is_noop() {
    let response = unready_app()
        .oneshot(create_form_request(" ... "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("Sentence:"));
    assert!(!html.contains("class=\"error\""));
}

#[tokio::test]
async fn test_form_without_annotator() {
    let response = unready_app()
        .oneshot(create_form_request("The cat sleeps."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = body_text(response).await;
    assert!(html.contains("class=\"error\""));
    // Submitted text is kept in the form
    assert!(html.contains("The cat sleeps."));
}

#[tokio::test]
async fn test_stylesheet() {
    let response = unready_app().oneshot(get("/static/style.css")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/css; charset=utf-8"
    );
}

#[tokio::test]
async fn test_openapi_document() {
    let response = unready_app()
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/v1/analyze"].is_object());
}

// =============================================================================
// CORS Tests
// =============================================================================

#[tokio::test]
async fn test_cors_allowed_origin() {
    let app = app_with_origins(&["http://allowed.example"]);
    let response = app
        .oneshot(analyze_from_origin("http://allowed.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_cors_disallowed_origin() {
    let app = app_with_origins(&["http://allowed.example"]);
    let response = app
        .oneshot(analyze_from_origin("http://other.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_without_configured_origins() {
    let (app, _) = ready_app();
    let response = app
        .oneshot(analyze_from_origin("http://allowed.example"))
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_wildcard_allows_any_origin() {
    let app = app_with_origins(&["*"]);
    let response = app
        .oneshot(analyze_from_origin("http://anywhere.example"))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_invalid_origin_is_skipped() {
    // A value that is not header-safe is ignored; the valid one still works
    let app = app_with_origins(&["bad\norigin", "http://allowed.example"]);
    let response = app
        .oneshot(analyze_from_origin("http://allowed.example"))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_not_found() {
    let response = unready_app().oneshot(get("/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
