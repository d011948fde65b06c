//! Member service for managing the member roster.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use quorum_store::{Document, DocumentStore, QueryFilter};

use crate::error::{AppError, AppResult};

/// Collection holding member records.
pub const MEMBERS_COLLECTION: &str = "members";

/// Request body for creating a member.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    /// Member display name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Membership status (default: "pending").
    #[serde(default = "default_status")]
    pub status: String,

    /// Any additional fields, stored as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_status() -> String {
    "pending".to_string()
}

/// Service for member operations.
#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn DocumentStore>,
}

impl MemberService {
    /// Create a new member service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a member record.
    pub async fn create(&self, request: CreateMemberRequest) -> AppResult<Document> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Member name is required".to_string()));
        }
        if !request.email.contains('@') {
            return Err(AppError::Validation(format!(
                "Invalid email address: '{}'",
                request.email
            )));
        }

        let mut data = request.extra;
        data.insert("name".to_string(), json!(request.name));
        data.insert("email".to_string(), json!(request.email));
        data.insert("status".to_string(), json!(request.status));

        let doc = self
            .store
            .create(MEMBERS_COLLECTION, serde_json::Value::Object(data))
            .await?;

        tracing::info!(member_id = %doc.id, "Member created");
        Ok(doc)
    }

    /// Get a member by id.
    pub async fn get(&self, id: &str) -> AppResult<Document> {
        Ok(self.store.get(MEMBERS_COLLECTION, id).await?)
    }

    /// List members, optionally filtered by status.
    pub async fn list(&self, status: Option<&str>) -> AppResult<Vec<Document>> {
        let filters: Vec<QueryFilter> = status
            .map(|s| vec![QueryFilter::eq("status", json!(s))])
            .unwrap_or_default();
        Ok(self.store.query(MEMBERS_COLLECTION, &filters).await?)
    }

    /// Apply a partial update to a member.
    pub async fn update(&self, id: &str, partial: serde_json::Value) -> AppResult<Document> {
        if !partial.is_object() {
            return Err(AppError::BadRequest(
                "Update body must be a JSON object".to_string(),
            ));
        }
        Ok(self.store.update(MEMBERS_COLLECTION, id, partial).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_store::MemoryStore;

    fn service() -> (Arc<MemoryStore>, MemberService) {
        let store = Arc::new(MemoryStore::new());
        let service = MemberService::new(store.clone() as Arc<dyn DocumentStore>);
        (store, service)
    }

    fn request(value: serde_json::Value) -> CreateMemberRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_, service) = service();
        let doc = service
            .create(request(json!({"name": "Ada", "email": "ada@example.org"})))
            .await
            .unwrap();

        assert_eq!(doc.field("status"), Some(&json!("pending")));

        let fetched = service.get(&doc.id).await.unwrap();
        assert_eq!(fetched.field("name"), Some(&json!("Ada")));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let (store, service) = service();
        let result = service
            .create(request(json!({"name": "Ada", "email": "not-an-email"})))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.count(MEMBERS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (_, service) = service();
        service
            .create(request(json!({
                "name": "Ada", "email": "ada@example.org", "status": "active"
            })))
            .await
            .unwrap();
        service
            .create(request(json!({"name": "Grace", "email": "grace@example.org"})))
            .await
            .unwrap();

        assert_eq!(service.list(None).await.unwrap().len(), 2);
        assert_eq!(service.list(Some("active")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extra_fields_stored() {
        let (_, service) = service();
        let doc = service
            .create(request(json!({
                "name": "Ada", "email": "ada@example.org", "chapter": "north"
            })))
            .await
            .unwrap();
        assert_eq!(doc.field("chapter"), Some(&json!("north")));
    }
}
