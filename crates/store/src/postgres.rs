//! PostgreSQL-backed document store.
//!
//! All collections share one JSONB-backed `quorum.document` table; the
//! collection name is a column, not a table. This keeps the store generic
//! over whatever collections rules and workflows touch.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document::Document;
use crate::error::StoreError;
use crate::store::{matches_filters, DocumentStore, QueryFilter, StoreResult};

/// Create a new database connection pool.
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await?;

    tracing::info!(max_connections, "Database connection pool created");
    Ok(pool)
}

/// PostgreSQL document store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

type DocumentRow = (
    String,
    String,
    serde_json::Value,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn row_to_document(row: DocumentRow) -> Document {
    let (id, collection, data, created_at, updated_at) = row;
    Document {
        id,
        collection,
        data,
        created_at,
        updated_at,
    }
}

impl PostgresStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema and document table if they do not exist.
    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query("CREATE SCHEMA IF NOT EXISTS quorum")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quorum.document (
                id TEXT NOT NULL,
                collection TEXT NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS document_data_idx ON quorum.document USING GIN (data)",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Document schema initialized");
        Ok(())
    }

}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM quorum.document
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_document)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn query(&self, collection: &str, filters: &[QueryFilter]) -> StoreResult<Vec<Document>> {
        // Containment against the GIN index covers scalar equality filters;
        // non-scalar filter values fall back to in-process matching.
        let mut containment = serde_json::Map::new();
        let mut residual: Vec<QueryFilter> = Vec::new();
        for f in filters {
            if f.value.is_object() || f.value.is_array() {
                residual.push(f.clone());
            } else {
                containment.insert(f.field.clone(), f.value.clone());
            }
        }

        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM quorum.document
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .bind(serde_json::Value::Object(containment))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(row_to_document)
            .filter(|d| matches_filters(d, &residual))
            .collect())
    }

    async fn create(&self, collection: &str, data: serde_json::Value) -> StoreResult<Document> {
        if !data.is_object() {
            return Err(StoreError::InvalidData {
                collection: collection.to_string(),
            });
        }

        let id = Uuid::new_v4().to_string();
        let row: DocumentRow = sqlx::query_as(
            r#"
            INSERT INTO quorum.document (id, collection, data, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(collection)
        .bind(&data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_document(row))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> StoreResult<Document> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            UPDATE quorum.document
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&partial)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_document)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_document() {
        let now = Utc::now();
        let doc = row_to_document((
            "d-1".to_string(),
            "members".to_string(),
            serde_json::json!({"name": "Ada"}),
            now,
            now,
        ));
        assert_eq!(doc.id, "d-1");
        assert_eq!(doc.collection, "members");
        assert_eq!(doc.field("name"), Some(&serde_json::json!("Ada")));
    }
}
