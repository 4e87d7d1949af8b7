// Error types: the search library's typed results, and the HTTP-facing
// AppError that turns them into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Malformed search input, reported before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter '{field}': {reason}")]
pub struct InvalidFilterError {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidFilterError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Everything `search` can fail with. Zero matches is not in here: it is an
/// `Ok` page with no data.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterError),

    #[error("data store unavailable: {0}")]
    DataStoreUnavailable(#[from] StoreError),
}

// --- HTTP layer ---

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    ServiceUnavailable(String),
}

impl From<InvalidFilterError> for AppError {
    fn from(error: InvalidFilterError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::InvalidFilter(e) => e.into(),
            SearchError::DataStoreUnavailable(e) => {
                // Keep the store detail in the logs only
                tracing::error!(error = %e, "Search failed against the document store");
                AppError::ServiceUnavailable("Listings are temporarily unavailable, please retry".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(message) => {
                tracing::debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::ServiceUnavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
