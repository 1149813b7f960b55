//! # In-memory document store
//!
//! Process-local backend used for development and tests. Documents live in
//! one `DashMap` per collection, keyed by id, with an insertion sequence that
//! defines the default order and breaks creation-time ties.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use domains::{
    Collection, Direction, Document, DocumentId, DocumentStore, Query, StoreError, Subscription,
};
use serde_json::Value;
use uuid::Uuid;

use crate::hub::SubscriptionHub;

struct Stored {
    seq: u64,
    doc: Document,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    tasks: DashMap<DocumentId, Stored>,
    comments: DashMap<DocumentId, Stored>,
    seq: AtomicU64,
    hub: SubscriptionHub,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open subscriptions; exposed for tests and diagnostics.
    pub fn active_subscriptions(&self) -> usize {
        self.hub.active()
    }

    fn table(&self, collection: Collection) -> &DashMap<DocumentId, Stored> {
        match collection {
            Collection::Tasks => &self.tasks,
            Collection::Comments => &self.comments,
        }
    }

    fn run_query(&self, query: &Query) -> Vec<Document> {
        let mut hits: Vec<(u64, Document)> = self
            .table(query.collection)
            .iter()
            .filter(|entry| query.matches(&entry.doc))
            .map(|entry| (entry.seq, entry.doc.clone()))
            .collect();

        match query.order_by_created {
            Some(Direction::Ascending) => {
                hits.sort_by(|(sa, a), (sb, b)| a.created_at.cmp(&b.created_at).then(sa.cmp(sb)))
            }
            Some(Direction::Descending) => {
                hits.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)))
            }
            None => hits.sort_by_key(|(seq, _)| *seq),
        }

        hits.into_iter().map(|(_, doc)| doc).collect()
    }

    async fn publish(&self, collection: Collection) {
        self.hub
            .refresh(collection, |query| std::future::ready(Ok(self.run_query(&query))))
            .await;
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: Collection, data: Value) -> Result<DocumentId, StoreError> {
        if !data.is_object() {
            return Err(StoreError::InvalidDocument(
                "document body must be a JSON object".into(),
            ));
        }

        let id = DocumentId::new(Uuid::new_v4().simple().to_string());
        let doc = Document {
            id: id.clone(),
            collection,
            created_at: Utc::now(),
            data,
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.table(collection).insert(id.clone(), Stored { seq, doc });
        tracing::debug!(%collection, %id, "document created");

        self.publish(collection).await;
        Ok(id)
    }

    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError> {
        if self.table(collection).remove(id).is_some() {
            tracing::debug!(%collection, %id, "document deleted");
            self.publish(collection).await;
        }
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.table(collection).get(id).map(|entry| entry.doc.clone()))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(self.run_query(query))
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        Ok(self.table(collection).len() as u64)
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let _guard = self.hub.lock().await;
        let initial = self.run_query(&query);
        Ok(self.hub.register(query, initial))
    }
}
