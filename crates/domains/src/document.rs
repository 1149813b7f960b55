//! # Document model
//!
//! The store is schema-less: every record is a JSON object living in a named
//! collection, with an identifier and creation time assigned by the store.
//! Entities in [`crate::models`] are decoded from these documents.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

/// Opaque, store-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The two collections the application writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Tasks,
    Comments,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Comments => "comments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record as the store hands it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub collection: Collection,
    /// Server-assigned at creation; never rewritten.
    pub created_at: DateTime<Utc>,
    /// The caller-supplied body, always a JSON object.
    pub data: Value,
}

impl Document {
    /// Top-level field lookup on the document body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Sort direction for the creation-time ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality predicate on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEq {
    pub field: String,
    pub value: Value,
}

/// A filtered, optionally ordered query over one collection.
///
/// Without an ordering the store returns documents in its default order
/// (insertion order for the bundled backends).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub filters: Vec<FieldEq>,
    pub order_by_created: Option<Direction>,
}

impl Query {
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by_created: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldEq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by_created(mut self, direction: Direction) -> Self {
        self.order_by_created = Some(direction);
        self
    }

    /// True when `doc` belongs to this query's collection and passes every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.collection == self.collection
            && self
                .filters
                .iter()
                .all(|f| doc.field(&f.field) == Some(&f.value))
    }
}

/// A full result set as delivered by a subscription.
pub type Snapshot = Arc<Vec<Document>>;

/// A standing query registered with a store.
///
/// The first call to [`Subscription::next`] yields the result set current at
/// subscription time; later calls wait for the store to redeliver. The
/// registration is released when the value is dropped, on every path.
pub struct Subscription {
    receiver: watch::Receiver<Snapshot>,
    initial_pending: bool,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new<F>(receiver: watch::Receiver<Snapshot>, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            receiver,
            initial_pending: true,
            release: Some(Box::new(release)),
        }
    }

    /// Wait for the next delivery. `None` once the store has closed the feed.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.initial_pending {
            self.initial_pending = false;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("initial_pending", &self.initial_pending)
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
