//! Car listing search for the marketplace.
//!
//! Filters published listings in a hosted document store: flat attributes
//! are queried natively, nested ones (pricing, specifications, color) are
//! refined in memory over the fetched page. See [`search::CarSearchService`].

use std::sync::Arc;

use axum::extract::FromRef;

pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod order;
pub mod pagination;
pub mod query;
pub mod refine;
pub mod routes;
pub mod search;
pub mod store;

pub use config::Settings;
pub use error::{InvalidFilterError, SearchError};
pub use filters::{CarSearchFilters, SortBy};
pub use models::{CarListing, Pagination, SearchResultPage};
pub use search::CarSearchService;
pub use store::{DocumentStore, StoreError, StoreResponse};

// Shared state for the HTTP handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub search: Arc<CarSearchService>,
}
