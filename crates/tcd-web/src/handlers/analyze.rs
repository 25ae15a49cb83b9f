//! Transitivity analysis API handlers
//!
//! Author: hephaex@gmail.com

use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tcd_analyzer::split_fragments;
use tcd_core::{AnalysisResult, ClauseRecord};
use utoipa::ToSchema;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Text submitted for analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextRequest {
    /// Free-form text, one or more period-terminated sentences
    #[serde(default)]
    pub text: String,
}

/// Classification of a single verb
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClauseDto {
    pub verb: String,
    /// Direct object, null when the verb has none
    pub direct_object: Option<String>,
    /// "Transitive" or "Intransitive"
    pub clause_type: String,
}

impl From<&ClauseRecord> for ClauseDto {
    fn from(clause: &ClauseRecord) -> Self {
        Self {
            verb: clause.verb().to_string(),
            direct_object: clause.direct_object().map(str::to_string),
            clause_type: clause.clause_type().to_string(),
        }
    }
}

/// Analysis of one fragment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SentenceDto {
    pub sentence: String,
    /// Empty when no verbs were detected
    pub clauses: Vec<ClauseDto>,
}

impl From<&AnalysisResult> for SentenceDto {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            sentence: result.sentence.clone(),
            clauses: result.clauses.iter().map(ClauseDto::from).collect(),
        }
    }
}

/// Analysis response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub sentences: Vec<SentenceDto>,
    pub processing_time_ms: u64,
}

/// Split response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitResponse {
    pub fragments: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Classify the verbs of every fragment in the text
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    tag = "analysis",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Analysis results", body = AnalyzeResponse),
        (status = 502, description = "Annotator failed", body = ApiError),
        (status = 503, description = "Annotator not available", body = ApiError)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let start = Instant::now();

    // Nothing to classify once the periods are gone
    if split_fragments(&req.text).is_empty() {
        return Ok(Json(AnalyzeResponse {
            sentences: Vec::new(),
            processing_time_ms: 0,
        }));
    }

    let classifier = state
        .classifier()
        .await
        .ok_or(AppError::Unavailable(None))?;

    let results = classifier.analyze(&req.text).await?;
    state.record_analysis();

    Ok(Json(AnalyzeResponse {
        sentences: results.iter().map(SentenceDto::from).collect(),
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Split text into the fragments that would be analyzed
#[utoipa::path(
    post,
    path = "/api/v1/split",
    tag = "analysis",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Fragments in input order", body = SplitResponse)
    )
)]
pub async fn split_handler(Json(req): Json<TextRequest>) -> Json<SplitResponse> {
    Json(SplitResponse {
        fragments: split_fragments(&req.text),
    })
}
