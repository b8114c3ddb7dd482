//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::UnknownAgent;
use crate::db::repository::RepositoryError;
use crate::services::InsightError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
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
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Unknown insight or metric
    NotFound(String),
    /// Invalid query parameters
    BadRequest(String),
    Repository(RepositoryError),
    Insight(InsightError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Repository(e) => {
                tracing::error!("Query failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("QUERY_FAILURE", e.to_string())
                        .with_details(e.context().to_string()),
                )
            }
            AppError::Insight(InsightError::QueryFailure(e)) => {
                return AppError::Repository(e).into_response();
            }
            AppError::Insight(e @ InsightError::MalformedMetric { .. }) => {
                tracing::error!("{}", e);
                let details = match &e {
                    InsightError::MalformedMetric { field, raw, .. } => {
                        Some(format!("field={}, raw={:?}", field, raw))
                    }
                    _ => None,
                };
                let mut body = ApiError::new(e.code(), e.to_string());
                body.details = details;
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        AppError::Insight(err)
    }
}

impl From<UnknownAgent> for AppError {
    fn from(err: UnknownAgent) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
