// Handlers for backend API endpoints

use axum::{
    extract::{rejection::JsonRejection, Json as JsonExtract, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{error::AppError, filters::CarSearchFilters, AppState, InvalidFilterError};

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// POST /api/cars/search
pub async fn search_cars(
    State(app_state): State<AppState>,
    body: Result<JsonExtract<CarSearchFilters>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A body that does not fit the filter shape is a bad filter like any other
    let JsonExtract(filters) = body.map_err(|rejection| InvalidFilterError::new("body", rejection.body_text()))?;
    tracing::info!(sort_by = ?filters.sort_by, has_cursor = filters.cursor().is_some(), "[HANDLER] /api/cars/search - Request received.");

    let page = app_state.search.search(&filters).await?;

    tracing::debug!(results = page.data.len(), "[HANDLER] /api/cars/search - Returning page.");
    Ok(Json(page))
}
