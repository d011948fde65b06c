//! Automation API handlers: workflows, rules, and points rules.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use quorum_store::Document;

use crate::engine::points::PointsOutcome;
use crate::engine::workflow::ExecutionResult;
use crate::error::AppResult;
use crate::services::automation::{
    AutomationService, RegisterRequest, RunWorkflowRequest, ScoreRequest,
};

/// Register a workflow definition.
///
/// `POST /api/workflows/register`
///
/// # Request Body
///
/// ```json
/// {
///   "content": "name: welcome\nstatus: active\nsteps:\n  - id: s1\n    type: trigger\n"
/// }
/// ```
pub async fn register_workflow(
    State(service): State<AutomationService>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.register_workflow(&request.content).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List workflow definitions.
///
/// `GET /api/workflows`
pub async fn list_workflows(
    State(service): State<AutomationService>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list_workflows().await?;
    Ok(Json(docs))
}

/// Run a workflow.
///
/// `POST /api/workflows/:id/run`
pub async fn run_workflow(
    State(service): State<AutomationService>,
    Path(id): Path<String>,
    Json(request): Json<RunWorkflowRequest>,
) -> AppResult<Json<ExecutionResult>> {
    let outcome = service.run_workflow(&id, request).await?;
    Ok(Json(outcome))
}

/// Register an automation rule.
///
/// `POST /api/rules/register`
pub async fn register_rule(
    State(service): State<AutomationService>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.register_rule(&request.content).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List automation rules.
///
/// `GET /api/rules`
pub async fn list_rules(
    State(service): State<AutomationService>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list_rules().await?;
    Ok(Json(docs))
}

/// Register a points rule.
///
/// `POST /api/points/rules/register`
pub async fn register_points_rule(
    State(service): State<AutomationService>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let doc = service.register_points_rule(&request.content).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List points rules.
///
/// `GET /api/points/rules`
pub async fn list_points_rules(
    State(service): State<AutomationService>,
) -> AppResult<Json<Vec<Document>>> {
    let docs = service.list_points_rules().await?;
    Ok(Json(docs))
}

/// Score an activity event.
///
/// `POST /api/points/score`
///
/// # Request Body
///
/// ```json
/// {
///   "memberId": "m-1",
///   "trigger": "attendance",
///   "activityData": {"hours": 3}
/// }
/// ```
pub async fn score(
    State(service): State<AutomationService>,
    Json(request): Json<ScoreRequest>,
) -> AppResult<Json<PointsOutcome>> {
    let outcome = service.score(request).await?;
    Ok(Json(outcome))
}
