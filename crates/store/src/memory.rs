//! In-memory document store.
//!
//! Used by engine tests and by single-process deployments
//! (`QUORUM_STORE=memory`). Semantics match the PostgreSQL store: server
//! assigns ids and timestamps, updates shallow-merge into existing payloads.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::Document;
use crate::error::StoreError;
use crate::store::{matches_filters, merge_into, DocumentStore, QueryFilter, StoreResult};

/// In-memory document store keyed by collection then id.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn query(&self, collection: &str, filters: &[QueryFilter]) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|c| {
                c.values()
                    .filter(|d| matches_filters(d, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable order for callers that list documents
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(docs)
    }

    async fn create(&self, collection: &str, data: serde_json::Value) -> StoreResult<Document> {
        if !data.is_object() {
            return Err(StoreError::InvalidData {
                collection: collection.to_string(),
            });
        }

        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            collection: collection.to_string(),
            data,
            created_at: now,
            updated_at: now,
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());

        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> StoreResult<Document> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        merge_into(&mut doc.data, &partial);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }
}
