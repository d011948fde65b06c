//! Execution history service.

use std::sync::Arc;

use serde_json::json;

use quorum_store::{Document, DocumentStore, QueryFilter};

use crate::engine::rules::RULE_EXECUTIONS_COLLECTION;
use crate::engine::workflow::EXECUTIONS_COLLECTION;
use crate::error::AppResult;

/// Service for listing execution records.
#[derive(Clone)]
pub struct ExecutionService {
    store: Arc<dyn DocumentStore>,
}

impl ExecutionService {
    /// Create a new execution service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List workflow executions, optionally filtered by workflow.
    pub async fn list_workflow_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> AppResult<Vec<Document>> {
        let filters: Vec<QueryFilter> = workflow_id
            .map(|id| vec![QueryFilter::eq("workflow_id", json!(id))])
            .unwrap_or_default();
        Ok(self.store.query(EXECUTIONS_COLLECTION, &filters).await?)
    }

    /// Get a workflow execution by id.
    pub async fn get_workflow_execution(&self, id: &str) -> AppResult<Document> {
        Ok(self.store.get(EXECUTIONS_COLLECTION, id).await?)
    }

    /// List rule executions, optionally filtered by rule.
    pub async fn list_rule_executions(&self, rule_id: Option<&str>) -> AppResult<Vec<Document>> {
        let filters: Vec<QueryFilter> = rule_id
            .map(|id| vec![QueryFilter::eq("rule_id", json!(id))])
            .unwrap_or_default();
        Ok(self
            .store
            .query(RULE_EXECUTIONS_COLLECTION, &filters)
            .await?)
    }
}
