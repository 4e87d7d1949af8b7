//! In-process document store.
//!
//! Evaluates [`NativeQuery`] predicates itself against top-level document
//! attributes, the same subset a hosted backend evaluates server-side. Used
//! by the tests and for running the service without a backend.

use std::cmp::Ordering;
use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, StoreResponse};
use crate::query::{Direction, NativeQuery, Predicate};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(collection: &str, documents: Vec<Value>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), documents);
        Self { collections: RwLock::new(collections) }
    }

    pub async fn insert(&self, collection: &str, document: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }
}

impl DocumentStore for MemoryStore {
    fn query<'a>(&'a self, query: &'a NativeQuery) -> BoxFuture<'a, Result<StoreResponse, StoreError>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            let documents = collections.get(&query.collection).map(Vec::as_slice).unwrap_or_default();
            run_query(documents, query)
        })
    }
}

fn run_query(documents: &[Value], query: &NativeQuery) -> Result<StoreResponse, StoreError> {
    let mut matched: Vec<&Value> = documents
        .iter()
        .filter(|doc| query.predicates.iter().all(|p| evaluate(doc, p)))
        .collect();

    if let Some(order) = &query.order {
        matched.sort_by(|a, b| {
            let ord = match (attribute(a, &order.attribute), attribute(b, &order.attribute)) {
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
    }

    let total = matched.len() as u64;

    let start = match &query.cursor {
        None => 0,
        Some(cursor) => {
            let position = matched
                .iter()
                .position(|doc| doc.get("$id").and_then(Value::as_str) == Some(cursor.as_str()))
                .ok_or_else(|| StoreError::CursorNotFound(cursor.clone()))?;
            position + 1
        }
    };

    let documents = matched.into_iter().skip(start).take(query.limit).cloned().collect();
    Ok(StoreResponse { documents, total })
}

// Top-level attribute; related documents stand in as their `$id`.
fn attribute<'a>(doc: &'a Value, name: &str) -> Option<&'a Value> {
    match doc.get(name)? {
        Value::Null => None,
        Value::Object(related) => related.get("$id"),
        value => Some(value),
    }
}

fn evaluate(doc: &Value, predicate: &Predicate) -> bool {
    let Some(value) = attribute(doc, predicate.attribute()) else {
        return false;
    };

    match predicate {
        Predicate::Equal { values, .. } => values.iter().any(|v| json_eq(value, v)),
        Predicate::GreaterThanEqual { value: bound, .. } => {
            compare(value, bound).is_some_and(|o| o != Ordering::Less)
        }
        Predicate::LessThanEqual { value: bound, .. } => {
            compare(value, bound).is_some_and(|o| o != Ordering::Greater)
        }
        Predicate::Search { text, .. } => {
            let Some(haystack) = value.as_str() else {
                return false;
            };
            let haystack = haystack.to_lowercase();
            text.split_whitespace()
                .all(|term| haystack.contains(&term.to_lowercase()))
        }
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

// Numbers compare numerically, strings lexicographically, anything else not at all.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
