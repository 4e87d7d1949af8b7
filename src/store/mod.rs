// The document store capability the search runs against.
//
// Concrete stores: `memory` evaluates native queries in-process, `appwrite`
// talks to the hosted backend over REST.

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use crate::query::NativeQuery;

pub mod appwrite;
pub mod memory;

pub use appwrite::AppwriteStore;
pub use memory::MemoryStore;

/// One page of raw documents plus the store's count of all documents
/// matching the query predicates (ignoring cursor and limit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreResponse {
    pub documents: Vec<Value>,
    pub total: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to document store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode document store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cursor document '{0}' not found")]
    CursorNotFound(String),

    #[error("document store misconfigured: {0}")]
    Misconfigured(String),
}

pub trait DocumentStore: Send + Sync {
    /// Runs one native query. Implementations own any retry policy.
    fn query<'a>(&'a self, query: &'a NativeQuery) -> BoxFuture<'a, Result<StoreResponse, StoreError>>;
}
