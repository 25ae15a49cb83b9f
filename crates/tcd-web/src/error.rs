//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tcd_core::TcdError;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn annotator_unavailable() -> Self {
        Self::new(
            "ANNOTATOR_UNAVAILABLE",
            "The language model is not loaded; analysis is unavailable",
        )
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Annotator is not provisioned or its model is missing
    Unavailable(Option<String>),
    /// Annotator was reached but failed or returned an unusable parse
    Annotator(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Annotator(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Unavailable(_) => {
                "The language model is not available. Please try again later.".to_string()
            }
            AppError::Annotator(_) => "The text could not be analyzed.".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn into_api_error(self) -> ApiError {
        match self {
            AppError::BadRequest(msg) => ApiError::bad_request(msg),
            AppError::Unavailable(None) => ApiError::annotator_unavailable(),
            AppError::Unavailable(Some(msg)) => ApiError::annotator_unavailable().with_details(msg),
            AppError::Annotator(msg) => {
                ApiError::new("ANNOTATOR_ERROR", "Annotator failed to parse the text")
                    .with_details(msg)
            }
            AppError::Internal(msg) => ApiError::internal_error().with_details(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        }
        (status, Json(self.into_api_error())).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<TcdError> for AppError {
    fn from(err: TcdError) -> Self {
        match err {
            TcdError::ModelUnavailable(msg) => AppError::Unavailable(Some(msg)),
            TcdError::Annotator(msg) => AppError::Annotator(msg),
            err @ TcdError::InvalidAnnotation { .. } => AppError::Annotator(err.to_string()),
            TcdError::Validation(msg) => AppError::BadRequest(msg),
            TcdError::Config(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            TcdError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
