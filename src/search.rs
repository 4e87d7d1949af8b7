//! Car listing search.
//!
//! One call is one native page: validate the criteria, translate what the
//! store can evaluate, fetch, refine the rest in memory, re-order when the
//! requested sort key is not native, and derive the cursor. Nothing is
//! shared between calls besides the injected store.

use std::sync::Arc;

use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::filters::CarSearchFilters;
use crate::models::{CarListing, SearchResultPage};
use crate::order::order;
use crate::pagination::paginate;
use crate::query::translate;
use crate::refine::refine;
use crate::store::{DocumentStore, StoreError};

pub struct CarSearchService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    settings: SearchSettings,
}

impl CarSearchService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>, settings: SearchSettings) -> Self {
        Self { store, collection: collection.into(), settings }
    }

    pub async fn search(&self, filters: &CarSearchFilters) -> Result<SearchResultPage, SearchError> {
        let limit = filters.validate(&self.settings)?;

        let query = translate(filters, &self.collection, limit);
        tracing::debug!(?query, ?filters, "Translated search filters");

        let response = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, collection = %self.collection, "Document store query failed");
            SearchError::DataStoreUnavailable(e)
        })?;

        let listings = response
            .documents
            .into_iter()
            .map(serde_json::from_value::<CarListing>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::error!(error = %e, "Document store returned a malformed listing");
                SearchError::DataStoreUnavailable(StoreError::Decode(e))
            })?;

        let native_count = listings.len();
        let native_last_id = listings.last().map(|l| l.id.clone());

        let mut refined = refine(listings, filters);
        order(&mut refined, filters.sort_by);

        let pagination = paginate(refined.len(), native_last_id.as_deref(), limit, response.total);

        tracing::debug!(native_count, refined_count = refined.len(), "Refined native page");
        tracing::info!(
            results = refined.len(),
            total = pagination.total,
            has_more = pagination.has_more,
            sort_by = ?filters.sort_by,
            "Search complete"
        );

        Ok(SearchResultPage { data: refined, pagination })
    }
}
