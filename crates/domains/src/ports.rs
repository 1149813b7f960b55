//! # Ports
//!
//! Storage and identity adapters implement these traits; services only ever
//! see `Arc<dyn DocumentStore>` and `Arc<dyn SessionProvider>`.

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Collection, Document, DocumentId, Query, Subscription};
use crate::errors::{AuthError, StoreError};
use crate::models::Session;

/// Document database contract.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `data` under a fresh id and server-assigned creation time.
    async fn create(&self, collection: Collection, data: Value) -> Result<DocumentId, StoreError>;

    /// Removes a document. Deleting an absent id succeeds without effect.
    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &DocumentId)
        -> Result<Option<Document>, StoreError>;

    /// One-shot snapshot of the query's result set.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: Collection) -> Result<u64, StoreError>;

    /// Opens a standing query that redelivers the full result set after
    /// every change to a matching collection.
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;
}

/// Identity provider contract.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SessionProvider: Send + Sync {
    /// Signs a session into an opaque token suitable for a cookie.
    fn issue(&self, session: &Session) -> Result<String, AuthError>;

    /// Returns the session a token carries, or `None` when it is invalid or expired.
    fn verify(&self, token: &str) -> Option<Session>;
}
