//! # Subscription hub
//!
//! Registry of standing queries shared by the storage backends. A backend
//! calls [`SubscriptionHub::refresh`] after every write; the hub re-runs each
//! standing query over the touched collection and redelivers the full result
//! set to subscribers whose view actually changed.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use domains::{Collection, Document, Query, Snapshot, StoreError, Subscription};
use tokio::sync::{watch, Mutex, MutexGuard};

struct Subscriber {
    query: Query,
    sender: watch::Sender<Snapshot>,
}

#[derive(Default)]
pub struct SubscriptionHub {
    next_id: AtomicU64,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    /// Serializes registration and redelivery so the last snapshot a
    /// subscriber sees was computed after the last write.
    publish: Mutex<()>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be held across the initial query and [`register`](Self::register).
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().await
    }

    pub fn register(&self, query: Query, initial: Vec<Document>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = watch::channel(Arc::new(initial));
        tracing::debug!(subscription = id, collection = %query.collection, "subscription opened");
        self.subscribers.insert(id, Subscriber { query, sender });

        let registry = Arc::downgrade(&self.subscribers);
        Subscription::new(receiver, move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(&id);
                tracing::debug!(subscription = id, "subscription released");
            }
        })
    }

    pub fn active(&self) -> usize {
        self.subscribers.len()
    }

    /// Re-runs every standing query over `collection` through `run`.
    ///
    /// Queries run one after another while the publish lock is held, so a
    /// write costs one re-query per standing subscription on `collection`.
    ///
    /// A failed re-query is logged and skipped; the subscriber keeps its
    /// previous snapshot until the next successful refresh.
    pub async fn refresh<F, Fut>(&self, collection: Collection, run: F)
    where
        F: Fn(Query) -> Fut,
        Fut: Future<Output = Result<Vec<Document>, StoreError>>,
    {
        let _guard = self.publish.lock().await;

        let standing: Vec<(u64, Query)> = self
            .subscribers
            .iter()
            .filter(|entry| entry.query.collection == collection)
            .map(|entry| (*entry.key(), entry.query.clone()))
            .collect();

        for (id, query) in standing {
            match run(query).await {
                Ok(docs) => self.deliver(id, docs),
                Err(err) => {
                    tracing::warn!(subscription = id, error = %err, "re-query failed; keeping last snapshot")
                }
            }
        }
    }

    fn deliver(&self, id: u64, docs: Vec<Document>) {
        let Some(subscriber) = self.subscribers.get(&id) else {
            return;
        };
        let changed = subscriber.sender.send_if_modified(|current| {
            if current.as_slice() == docs.as_slice() {
                false
            } else {
                *current = Arc::new(docs);
                true
            }
        });
        if changed {
            tracing::trace!(subscription = id, "snapshot redelivered");
        }
    }
}
