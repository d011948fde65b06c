//! Dues service for recording member payments.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use quorum_store::{Document, DocumentStore, QueryFilter, StoreError};

use crate::error::{AppError, AppResult};
use crate::services::member::MEMBERS_COLLECTION;

/// Collection holding dues records.
pub const DUES_COLLECTION: &str = "dues";

/// Request body for recording a dues payment.
#[derive(Debug, Deserialize)]
pub struct RecordDuesRequest {
    /// Paying member.
    #[serde(alias = "memberId")]
    pub member_id: String,

    /// Payment amount.
    pub amount: f64,

    /// Entry type (default: "income").
    #[serde(default = "default_entry_type", rename = "type")]
    pub entry_type: String,

    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

fn default_entry_type() -> String {
    "income".to_string()
}

/// Service for dues operations.
#[derive(Clone)]
pub struct DuesService {
    store: Arc<dyn DocumentStore>,
}

impl DuesService {
    /// Create a new dues service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record a dues payment for an existing member.
    pub async fn record(&self, request: RecordDuesRequest) -> AppResult<Document> {
        if !request.amount.is_finite() {
            return Err(AppError::Validation(
                "Amount must be a finite number".to_string(),
            ));
        }

        // The member must exist before a payment can reference it
        match self.store.get(MEMBERS_COLLECTION, &request.member_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::NotFound(format!(
                    "Member '{}' not found",
                    request.member_id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let doc = self
            .store
            .create(
                DUES_COLLECTION,
                json!({
                    "member_id": request.member_id,
                    "amount": request.amount,
                    "type": request.entry_type,
                    "note": request.note,
                    "recorded_at": chrono::Utc::now(),
                }),
            )
            .await?;

        tracing::info!(
            dues_id = %doc.id,
            member_id = %request.member_id,
            amount = request.amount,
            "Dues recorded"
        );
        Ok(doc)
    }

    /// Get a dues record by id.
    pub async fn get(&self, id: &str) -> AppResult<Document> {
        Ok(self.store.get(DUES_COLLECTION, id).await?)
    }

    /// List dues records, optionally filtered by member.
    pub async fn list(&self, member_id: Option<&str>) -> AppResult<Vec<Document>> {
        let filters: Vec<QueryFilter> = member_id
            .map(|m| vec![QueryFilter::eq("member_id", json!(m))])
            .unwrap_or_default();
        Ok(self.store.query(DUES_COLLECTION, &filters).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_store::MemoryStore;

    async fn service_with_member() -> (Arc<MemoryStore>, DuesService, String) {
        let store = Arc::new(MemoryStore::new());
        let member = store
            .create(MEMBERS_COLLECTION, json!({"name": "Ada"}))
            .await
            .unwrap();
        let service = DuesService::new(store.clone() as Arc<dyn DocumentStore>);
        (store, service, member.id)
    }

    fn request(value: serde_json::Value) -> RecordDuesRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_record_for_existing_member() {
        let (_, service, member_id) = service_with_member().await;
        let doc = service
            .record(request(json!({"memberId": member_id, "amount": 150.0})))
            .await
            .unwrap();

        assert_eq!(doc.field("amount"), Some(&json!(150.0)));
        assert_eq!(doc.field("type"), Some(&json!("income")));
    }

    #[tokio::test]
    async fn test_unknown_member_rejected() {
        let (store, service, _) = service_with_member().await;
        let result = service
            .record(request(json!({"memberId": "ghost", "amount": 10.0})))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.count(DUES_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_member() {
        let (store, service, member_id) = service_with_member().await;
        let other = store
            .create(MEMBERS_COLLECTION, json!({"name": "Grace"}))
            .await
            .unwrap();

        service
            .record(request(json!({"memberId": member_id, "amount": 10.0})))
            .await
            .unwrap();
        service
            .record(request(json!({"memberId": other.id, "amount": 20.0})))
            .await
            .unwrap();

        assert_eq!(service.list(None).await.unwrap().len(), 2);
        assert_eq!(service.list(Some(&member_id)).await.unwrap().len(), 1);
    }
}
