//! Document service for shared organizational documents.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use quorum_store::{Document, DocumentStore};

use crate::error::{AppError, AppResult};

/// Collection holding organizational documents.
pub const DOCUMENTS_COLLECTION: &str = "documents";

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Document title.
    pub title: String,

    /// Document body.
    #[serde(default)]
    pub content: String,

    /// Any additional fields, stored as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Service for document operations.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a document.
    pub async fn create(&self, request: CreateDocumentRequest) -> AppResult<Document> {
        if request.title.trim().is_empty() {
            return Err(AppError::Validation(
                "Document title is required".to_string(),
            ));
        }

        let mut data = request.extra;
        data.insert("title".to_string(), json!(request.title));
        data.insert("content".to_string(), json!(request.content));

        Ok(self
            .store
            .create(DOCUMENTS_COLLECTION, serde_json::Value::Object(data))
            .await?)
    }

    /// Get a document by id.
    pub async fn get(&self, id: &str) -> AppResult<Document> {
        Ok(self.store.get(DOCUMENTS_COLLECTION, id).await?)
    }

    /// List all documents.
    pub async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.store.query(DOCUMENTS_COLLECTION, &[]).await?)
    }

    /// Apply a partial update to a document.
    pub async fn update(&self, id: &str, partial: serde_json::Value) -> AppResult<Document> {
        if !partial.is_object() {
            return Err(AppError::BadRequest(
                "Update body must be a JSON object".to_string(),
            ));
        }
        Ok(self.store.update(DOCUMENTS_COLLECTION, id, partial).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_store::MemoryStore;

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>)
    }

    #[tokio::test]
    async fn test_create_update_get() {
        let service = service();
        let doc = service
            .create(
                serde_json::from_value(json!({"title": "Minutes", "content": "..."})).unwrap(),
            )
            .await
            .unwrap();

        service
            .update(&doc.id, json!({"content": "approved"}))
            .await
            .unwrap();

        let fetched = service.get(&doc.id).await.unwrap();
        assert_eq!(fetched.field("title"), Some(&json!("Minutes")));
        assert_eq!(fetched.field("content"), Some(&json!("approved")));
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let service = service();
        let result = service
            .create(serde_json::from_value(json!({"title": "  "})).unwrap())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
