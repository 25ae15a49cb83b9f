//! HTML page handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use crate::views::IndexTemplate;
use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tcd_analyzer::split_fragments;

const STYLESHEET: &str = include_str!("../../static/style.css");

/// Submitted form
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
}

fn render_page(status: StatusCode, page: IndexTemplate) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::Internal(format!("template rendering failed: {e}")).into_response(),
    }
}

/// Input form
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    render_page(StatusCode::OK, IndexTemplate::new(state.model().await))
}

/// Analyze the submitted text and render the results below the form
///
/// Input with no sentences (blank, or only periods) re-renders the empty
/// form without calling the annotator.
pub async fn analyze_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    let page = IndexTemplate::new(state.model().await);

    if split_fragments(&form.text).is_empty() {
        return render_page(StatusCode::OK, page);
    }

    let Some(classifier) = state.classifier().await else {
        let err = AppError::Unavailable(None);
        let status = err.status();
        return render_page(status, page.with_error(form.text, err.user_message()));
    };

    match classifier.analyze(&form.text).await {
        Ok(results) => {
            state.record_analysis();
            render_page(StatusCode::OK, page.with_results(form.text, &results))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Form analysis failed");
            let err = AppError::from(e);
            let status = err.status();
            render_page(status, page.with_error(form.text, err.user_message()))
        }
    }
}

/// Page stylesheet
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
