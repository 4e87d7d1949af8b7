// Document store backed by the hosted backend's databases REST API
//
// GET {endpoint}/databases/{db}/collections/{collection}/documents
//     ?queries[]={"method":"equal","attribute":"status","values":["published"]}&...

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;

use super::{DocumentStore, StoreError, StoreResponse};
use crate::config::StoreSettings;
use crate::query::{Direction, NativeQuery, Predicate};

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

// --- Response Structures ---

#[derive(Deserialize, Debug)]
struct DocumentList {
    total: u64,
    #[serde(default)]
    documents: Vec<Value>,
}

pub struct AppwriteStore {
    client: Client,
    endpoint: String,
    database_id: String,
    max_retries: u32,
    initial_retry_delay: Duration,
}

impl AppwriteStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let project_id = settings
            .project_id
            .as_deref()
            .ok_or_else(|| StoreError::Misconfigured("store.project_id is not set".into()))?;
        let database_id = settings
            .database_id
            .clone()
            .ok_or_else(|| StoreError::Misconfigured("store.database_id is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_HEADER, header_value(project_id)?);
        if let Some(key) = settings.api_key.as_deref() {
            let mut value = header_value(key)?;
            value.set_sensitive(true);
            headers.insert(KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            database_id,
            max_retries: settings.max_retries,
            initial_retry_delay: Duration::from_millis(settings.initial_retry_delay_ms),
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection
        )
    }

    // Retries transient failures with exponential backoff
    async fn fetch(&self, query: &NativeQuery) -> Result<StoreResponse, StoreError> {
        let url = self.documents_url(&query.collection);
        let params: Vec<(&str, String)> = encode_queries(query)
            .into_iter()
            .map(|q| ("queries[]", q))
            .collect();

        let mut retry_delay = self.initial_retry_delay;
        let mut attempt = 0;
        loop {
            tracing::debug!(attempt, url = %url, "Querying document store");
            match self.fetch_once(&url, &params).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    tracing::warn!(attempt, error = %e, "Transient document store error. Retrying...");
                    sleep(retry_delay).await;
                    retry_delay = next_retry_delay(retry_delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str, params: &[(&str, String)]) -> Result<StoreResponse, StoreError> {
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "[Failed to read response body]".to_string());
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let list: DocumentList = serde_json::from_slice(&bytes)?;
        Ok(StoreResponse { documents: list.documents, total: list.total })
    }
}

impl DocumentStore for AppwriteStore {
    fn query<'a>(&'a self, query: &'a NativeQuery) -> BoxFuture<'a, Result<StoreResponse, StoreError>> {
        Box::pin(self.fetch(query))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|e| StoreError::Misconfigured(format!("invalid header value: {}", e)))
}

// Doubles, capped at MAX_RETRY_DELAY
fn next_retry_delay(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY)
}

fn is_transient(error: &StoreError) -> bool {
    match error {
        StoreError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
        StoreError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

// --- Query Serialization ---

/// One JSON-encoded query string per `queries[]` parameter.
pub fn encode_queries(query: &NativeQuery) -> Vec<String> {
    let mut encoded: Vec<Value> = query.predicates.iter().map(encode_predicate).collect();

    if let Some(order) = &query.order {
        let method = match order.direction {
            Direction::Asc => "orderAsc",
            Direction::Desc => "orderDesc",
        };
        encoded.push(json!({ "method": method, "attribute": order.attribute }));
    }
    if let Some(cursor) = &query.cursor {
        encoded.push(json!({ "method": "cursorAfter", "values": [cursor] }));
    }
    encoded.push(json!({ "method": "limit", "values": [query.limit] }));

    encoded.iter().map(Value::to_string).collect()
}

fn encode_predicate(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::Equal { attribute, values } => {
            json!({ "method": "equal", "attribute": attribute, "values": values })
        }
        Predicate::GreaterThanEqual { attribute, value } => {
            json!({ "method": "greaterThanEqual", "attribute": attribute, "values": [value] })
        }
        Predicate::LessThanEqual { attribute, value } => {
            json!({ "method": "lessThanEqual", "attribute": attribute, "values": [value] })
        }
        Predicate::Search { attribute, text } => {
            json!({ "method": "search", "attribute": attribute, "values": [text] })
        }
    }
}
