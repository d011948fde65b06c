//! Execution history API handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use quorum_store::Document;

use crate::error::AppResult;
use crate::services::execution::ExecutionService;

/// Query parameters for listing workflow executions.
#[derive(Debug, Default, Deserialize)]
pub struct ListExecutionsQuery {
    /// Filter by workflow.
    pub workflow_id: Option<String>,
}

/// Query parameters for listing rule executions.
#[derive(Debug, Default, Deserialize)]
pub struct ListRuleExecutionsQuery {
    /// Filter by rule.
    pub rule_id: Option<String>,
}

/// List workflow executions.
///
/// `GET /api/executions?workflow_id=wf-1`
pub async fn list(
    State(service): State<ExecutionService>,
    Query(query): Query<ListExecutionsQuery>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service
        .list_workflow_executions(query.workflow_id.as_deref())
        .await?;
    Ok(Json(docs))
}

/// Get a workflow execution by id.
///
/// `GET /api/executions/:id`
pub async fn get(
    State(service): State<ExecutionService>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let doc = service.get_workflow_execution(&id).await?;
    Ok(Json(doc))
}

/// List rule executions.
///
/// `GET /api/rule-executions?rule_id=r-1`
pub async fn list_rule_executions(
    State(service): State<ExecutionService>,
    Query(query): Query<ListRuleExecutionsQuery>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service
        .list_rule_executions(query.rule_id.as_deref())
        .await?;
    Ok(Json(docs))
}
