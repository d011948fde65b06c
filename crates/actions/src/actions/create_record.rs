//! Record creation action.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quorum_store::DocumentStore;

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::registry::Action;
use crate::spec::ActionSpec;

/// Configuration for `create_record`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordConfig {
    /// Collection to create the document in.
    pub collection: String,

    /// Document payload; must be a JSON object.
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl CreateRecordConfig {
    /// Parse and validate the configuration object.
    pub fn parse(config: &serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(config.clone())
            .map_err(|e| ActionError::InvalidConfiguration(format!("create_record: {}", e)))
    }
}

/// Creates a new document; the store assigns id and creation timestamp.
pub struct CreateRecordAction {
    store: Arc<dyn DocumentStore>,
}

impl CreateRecordAction {
    /// Create the action over a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for CreateRecordAction {
    fn name(&self) -> &'static str {
        "create_record"
    }

    async fn execute(
        &self,
        spec: &ActionSpec,
        _ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let config = CreateRecordConfig::parse(&spec.config)?;

        let doc = self
            .store
            .create(&config.collection, serde_json::Value::Object(config.data))
            .await?;

        tracing::debug!(
            collection = %config.collection,
            document_id = %doc.id,
            "Record created"
        );

        Ok(serde_json::json!({
            "collection": config.collection,
            "document_id": doc.id,
        }))
    }
}
