// Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

mod api;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/cars/search", post(api::search_cars))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
