//! # Postgres document store
//!
//! All collections share one `documents` table with a JSONB body. Equality
//! filters compile to `data -> field = value` and the `seq` column gives the
//! default order and the creation-time tie-break.
//!
//! Subscriptions observe writes made through this process only.
// TODO: LISTEN/NOTIFY on `documents` so writes from other replicas reach subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    Collection, Direction, Document, DocumentId, DocumentStore, Query, StoreError, Subscription,
};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::hub::SubscriptionHub;

pub struct PgDocumentStore {
    pool: PgPool,
    hub: SubscriptionHub,
}

fn store_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

fn parse_collection(name: &str) -> Result<Collection, StoreError> {
    match name {
        "tasks" => Ok(Collection::Tasks),
        "comments" => Ok(Collection::Comments),
        other => Err(StoreError::InvalidDocument(format!("unknown collection `{other}`"))),
    }
}

fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
    let id: String = row.try_get("id").map_err(store_err)?;
    let collection: String = row.try_get("collection").map_err(store_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(store_err)?;
    let Json(data): Json<Value> = row.try_get("data").map_err(store_err)?;
    Ok(Document {
        id: DocumentId::new(id),
        collection: parse_collection(&collection)?,
        created_at,
        data,
    })
}

fn select(query: &Query) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, collection, created_at, data FROM documents WHERE collection = ",
    );
    qb.push_bind(query.collection.as_str());
    for filter in &query.filters {
        qb.push(" AND data -> ");
        qb.push_bind(filter.field.clone());
        qb.push(" = ");
        qb.push_bind(Json(filter.value.clone()));
    }
    qb.push(match query.order_by_created {
        Some(Direction::Ascending) => " ORDER BY created_at ASC, seq ASC",
        Some(Direction::Descending) => " ORDER BY created_at DESC, seq DESC",
        None => " ORDER BY seq ASC",
    });
    qb
}

impl PgDocumentStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(store_err)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            hub: SubscriptionHub::new(),
        }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let rows = select(query)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.iter().map(row_to_document).collect()
    }

    async fn publish(&self, collection: Collection) {
        self.hub
            .refresh(collection, |query| async move { self.run_query(&query).await })
            .await;
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: Collection, data: Value) -> Result<DocumentId, StoreError> {
        if !data.is_object() {
            return Err(StoreError::InvalidDocument(
                "document body must be a JSON object".into(),
            ));
        }

        let id = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(collection.as_str())
            .bind(Json(&data))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        tracing::debug!(%collection, %id, "document created");

        self.publish(collection).await;
        Ok(DocumentId::new(id))
    }

    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() > 0 {
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
        let row = sqlx::query(
            "SELECT id, collection, created_at, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.run_query(query).await
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(count.max(0) as u64)
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let _guard = self.hub.lock().await;
        let initial = self.run_query(&query).await?;
        Ok(self.hub.register(query, initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_binds_collection_and_each_filter() {
        let q = Query::collection(Collection::Tasks)
            .where_eq("owner", "a@x.com")
            .order_by_created(Direction::Descending);
        assert_eq!(
            select(&q).sql(),
            "SELECT id, collection, created_at, data FROM documents WHERE collection = $1 \
             AND data -> $2 = $3 ORDER BY created_at DESC, seq DESC"
        );
    }

    #[test]
    fn unordered_select_uses_insertion_order() {
        let q = Query::collection(Collection::Comments).where_eq("task_id", "T1");
        assert!(select(&q).sql().ends_with("ORDER BY seq ASC"));
    }

    #[test]
    fn collection_names_round_trip() {
        for c in [Collection::Tasks, Collection::Comments] {
            assert_eq!(parse_collection(c.as_str()).unwrap(), c);
        }
        assert!(parse_collection("users").is_err());
    }
}
