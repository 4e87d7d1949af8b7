use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use carmarket_search::config::StoreSettings;
use carmarket_search::query::{Direction, NativeQuery, OrderBy, Predicate};
use carmarket_search::store::AppwriteStore;
use carmarket_search::{DocumentStore, StoreError};
use serde_json::{json, Value};

// Mock backend: fails the first `failures` requests with `failure_status`
#[derive(Clone)]
struct MockBackend {
    hits: Arc<AtomicUsize>,
    failures: usize,
    failure_status: StatusCode,
    seen_queries: Arc<Mutex<Vec<String>>>,
    seen_headers: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    fn new(failures: usize, failure_status: StatusCode) -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            failures,
            failure_status,
            seen_queries: Arc::new(Mutex::new(Vec::new())),
            seen_headers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn list_documents(
    State(mock): State<MockBackend>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let hit = mock.hits.fetch_add(1, Ordering::SeqCst);

    *mock.seen_queries.lock().unwrap() = params
        .into_iter()
        .filter(|(k, _)| k == "queries[]")
        .map(|(_, v)| v)
        .collect();
    *mock.seen_headers.lock().unwrap() = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-appwrite"))
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap().to_string()))
        .collect();

    if hit < mock.failures {
        return (mock.failure_status, Json(json!({ "message": "try later" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "total": 7,
            "documents": [{ "$id": "car-1", "title": "Mazda CX-5" }]
        })),
    )
}

async fn spawn_mock(mock: MockBackend) -> String {
    let app = Router::new()
        .route("/v1/databases/main/collections/cars/documents", get(list_documents))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn store_settings(endpoint: String, max_retries: u32) -> StoreSettings {
    StoreSettings {
        endpoint,
        project_id: Some("dealer-project".into()),
        api_key: Some("server-key".into()),
        database_id: Some("main".into()),
        collection_id: "cars".into(),
        request_timeout_secs: 5,
        max_retries,
        initial_retry_delay_ms: 1,
    }
}

fn native_query() -> NativeQuery {
    NativeQuery {
        collection: "cars".into(),
        predicates: vec![
            Predicate::equal("status", vec![json!("published")]),
            Predicate::Search { attribute: "title".into(), text: "mazda".into() },
        ],
        order: Some(OrderBy { attribute: "year".into(), direction: Direction::Asc }),
        limit: 12,
        cursor: Some("car-0".into()),
    }
}

#[tokio::test]
async fn sends_queries_and_project_headers() {
    let mock = MockBackend::new(0, StatusCode::OK);
    let endpoint = spawn_mock(mock.clone()).await;
    let store = AppwriteStore::new(&store_settings(endpoint, 0)).unwrap();

    let response = store.query(&native_query()).await.unwrap();
    assert_eq!(response.total, 7);
    assert_eq!(response.documents.len(), 1);
    assert_eq!(response.documents[0]["$id"], "car-1");

    let queries: Vec<Value> = mock
        .seen_queries
        .lock()
        .unwrap()
        .iter()
        .map(|q| serde_json::from_str(q).unwrap())
        .collect();
    assert_eq!(
        queries,
        vec![
            json!({ "method": "equal", "attribute": "status", "values": ["published"] }),
            json!({ "method": "search", "attribute": "title", "values": ["mazda"] }),
            json!({ "method": "orderAsc", "attribute": "year" }),
            json!({ "method": "cursorAfter", "values": ["car-0"] }),
            json!({ "method": "limit", "values": [12] }),
        ]
    );

    let headers = mock.seen_headers.lock().unwrap().clone();
    assert!(headers.contains(&("x-appwrite-project".into(), "dealer-project".into())));
    assert!(headers.contains(&("x-appwrite-key".into(), "server-key".into())));
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let mock = MockBackend::new(2, StatusCode::SERVICE_UNAVAILABLE);
    let endpoint = spawn_mock(mock.clone()).await;
    let store = AppwriteStore::new(&store_settings(endpoint, 3)).unwrap();

    let response = store.query(&native_query()).await.unwrap();
    assert_eq!(response.total, 7);
    assert_eq!(mock.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let mock = MockBackend::new(10, StatusCode::TOO_MANY_REQUESTS);
    let endpoint = spawn_mock(mock.clone()).await;
    let store = AppwriteStore::new(&store_settings(endpoint, 2)).unwrap();

    let result = store.query(&native_query()).await;
    assert!(matches!(result, Err(StoreError::Status { status: 429, .. })));
    assert_eq!(mock.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mock = MockBackend::new(10, StatusCode::UNAUTHORIZED);
    let endpoint = spawn_mock(mock.clone()).await;
    let store = AppwriteStore::new(&store_settings(endpoint, 3)).unwrap();

    let result = store.query(&native_query()).await;
    assert!(matches!(result, Err(StoreError::Status { status: 401, .. })));
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_collection_is_a_status_error() {
    let mock = MockBackend::new(0, StatusCode::OK);
    let endpoint = spawn_mock(mock.clone()).await;
    let store = AppwriteStore::new(&store_settings(endpoint, 0)).unwrap();

    let mut query = native_query();
    query.collection = "boats".into();
    let result = store.query(&query).await;
    assert!(matches!(result, Err(StoreError::Status { status: 404, .. })));
}
