//! Field update action.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quorum_store::DocumentStore;

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::registry::Action;
use crate::spec::ActionSpec;

/// Configuration for `update_field`.
///
/// Accepts both snake_case and the camelCase keys rule definitions are
/// commonly written with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFieldConfig {
    /// Collection containing the target document.
    pub collection: String,

    /// Target document id.
    #[serde(alias = "documentId")]
    pub document_id: String,

    /// Field to write.
    pub field: String,

    /// Value to write (defaults to null).
    #[serde(default)]
    pub value: serde_json::Value,
}

impl UpdateFieldConfig {
    /// Parse and validate the configuration object.
    pub fn parse(config: &serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(config.clone())
            .map_err(|e| ActionError::InvalidConfiguration(format!("update_field: {}", e)))
    }
}

/// Writes one field on an existing document.
///
/// The store stamps the update timestamp; no other fields are touched.
pub struct UpdateFieldAction {
    store: Arc<dyn DocumentStore>,
}

impl UpdateFieldAction {
    /// Create the action over a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for UpdateFieldAction {
    fn name(&self) -> &'static str {
        "update_field"
    }

    async fn execute(
        &self,
        spec: &ActionSpec,
        _ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let config = UpdateFieldConfig::parse(&spec.config)?;

        let partial = serde_json::json!({ config.field.clone(): config.value });
        self.store
            .update(&config.collection, &config.document_id, partial)
            .await?;

        tracing::debug!(
            collection = %config.collection,
            document_id = %config.document_id,
            field = %config.field,
            "Field updated"
        );

        Ok(serde_json::json!({
            "collection": config.collection,
            "document_id": config.document_id,
            "field": config.field,
            "updated": true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_store::MemoryStore;

    fn spec(mut config: serde_json::Value) -> ActionSpec {
        config["type"] = serde_json::json!("update_field");
        serde_json::from_value(config).unwrap()
    }

    #[tokio::test]
    async fn test_updates_field() {
        let store = Arc::new(MemoryStore::new());
        let doc = store
            .create("members", serde_json::json!({"status": "pending"}))
            .await
            .unwrap();

        let action = UpdateFieldAction::new(store.clone());
        let result = action
            .execute(
                &spec(serde_json::json!({
                    "collection": "members",
                    "documentId": doc.id,
                    "field": "status",
                    "value": "active"
                })),
                &ActionContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(result["updated"], serde_json::json!(true));
        let updated = store.get("members", &doc.id).await.unwrap();
        assert_eq!(updated.field("status"), Some(&serde_json::json!("active")));
    }

    #[tokio::test]
    async fn test_missing_document_id_performs_no_write() {
        let store = Arc::new(MemoryStore::new());
        store
            .create("members", serde_json::json!({"status": "pending"}))
            .await
            .unwrap();

        let action = UpdateFieldAction::new(store.clone());
        let result = action
            .execute(
                &spec(serde_json::json!({
                    "collection": "members",
                    "field": "status",
                    "value": "active"
                })),
                &ActionContext::default(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ActionError::InvalidConfiguration(_))
        ));

        // The existing document is untouched
        let docs = store.query("members", &[]).await.unwrap();
        assert_eq!(docs[0].field("status"), Some(&serde_json::json!("pending")));
    }

    #[tokio::test]
    async fn test_missing_target_is_store_error() {
        let store = Arc::new(MemoryStore::new());
        let action = UpdateFieldAction::new(store);

        let result = action
            .execute(
                &spec(serde_json::json!({
                    "collection": "members",
                    "documentId": "ghost",
                    "field": "status",
                    "value": "active"
                })),
                &ActionContext::default(),
            )
            .await;

        assert!(matches!(result, Err(ActionError::Store(_))));
    }
}
