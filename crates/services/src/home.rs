//! Landing-page statistics.
//!
//! Counts are recomputed at most once per revalidation window; in between,
//! every request is served the cached pair.

use std::sync::Arc;
use std::time::Duration;

use domains::{Collection, DocumentStore, StoreError};
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub tasks: u64,
    pub comments: u64,
}

pub struct HomeStats {
    store: Arc<dyn DocumentStore>,
    revalidate: Duration,
    cached: Mutex<Option<(Instant, Counts)>>,
}

impl HomeStats {
    pub fn new(store: Arc<dyn DocumentStore>, revalidate: Duration) -> Self {
        Self {
            store,
            revalidate,
            cached: Mutex::new(None),
        }
    }

    /// Cached counts, recounting once the window has passed.
    ///
    /// A failed recount serves the previous value (zero before the first
    /// success) and is retried on the next call.
    pub async fn counts(&self) -> Counts {
        let mut cached = self.cached.lock().await;
        if let Some((at, counts)) = *cached {
            if at.elapsed() < self.revalidate {
                return counts;
            }
        }

        match self.recount().await {
            Ok(counts) => {
                tracing::debug!(tasks = counts.tasks, comments = counts.comments, "home counts refreshed");
                *cached = Some((Instant::now(), counts));
                counts
            }
            Err(err) => {
                tracing::warn!(error = %err, "home recount failed; serving previous counts");
                cached.map(|(_, counts)| counts).unwrap_or_default()
            }
        }
    }

    async fn recount(&self) -> Result<Counts, StoreError> {
        let (tasks, comments) = tokio::try_join!(
            self.store.count(Collection::Tasks),
            self.store.count(Collection::Comments),
        )?;
        Ok(Counts { tasks, comments })
    }
}
