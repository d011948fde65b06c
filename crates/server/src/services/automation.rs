//! Automation service: the definition catalog and the engine entry points.
//!
//! Definitions (workflows, rules, points rules) are submitted as YAML or
//! JSON content, validated at registration, and stored as documents. The
//! run and score entry points load a definition fresh from the store, so an
//! update takes effect on the next run without a restart.

use std::sync::Arc;

use serde::Deserialize;

use quorum_actions::{ActionRegistry, ActionSpec};
use quorum_store::{Document, DocumentStore};

use crate::engine::points::{PointsEngine, PointsOutcome, PointsRule, POINTS_RULES_COLLECTION};
use crate::engine::rules::{RuleDefinition, RULES_COLLECTION};
use crate::engine::workflow::{
    ExecutionResult, StepKind, WorkflowDefinition, WorkflowEngine,
};
use crate::error::{AppError, AppResult};

/// Collection holding workflow definitions.
pub const WORKFLOWS_COLLECTION: &str = "workflows";

/// Request body for registering a definition.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// YAML or JSON definition content.
    pub content: String,
}

/// Request body for running a workflow.
#[derive(Debug, Default, Deserialize)]
pub struct RunWorkflowRequest {
    /// Initial run context.
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,

    /// Caller-supplied initiator identity, recorded on the execution.
    #[serde(default, alias = "initiatedBy")]
    pub initiated_by: Option<String>,
}

/// Request body for scoring an activity event.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    /// Member to score for.
    #[serde(alias = "memberId")]
    pub member_id: String,

    /// Activity trigger key.
    pub trigger: String,

    /// Activity data the conditions evaluate against.
    #[serde(default, alias = "activityData")]
    pub activity: serde_json::Value,
}

/// Service for automation definitions and engine entry points.
#[derive(Clone)]
pub struct AutomationService {
    store: Arc<dyn DocumentStore>,
    workflows: Arc<WorkflowEngine>,
    points: Arc<PointsEngine>,
}

impl AutomationService {
    /// Create a new automation service.
    pub fn new(store: Arc<dyn DocumentStore>, actions: Arc<ActionRegistry>) -> Self {
        Self {
            workflows: Arc::new(WorkflowEngine::new(store.clone(), actions.clone())),
            points: Arc::new(PointsEngine::new(store.clone(), actions)),
            store,
        }
    }

    /// Register a workflow definition.
    ///
    /// Step action configurations are validated here; a workflow with a
    /// malformed action never reaches the catalog.
    pub async fn register_workflow(&self, content: &str) -> AppResult<Document> {
        let definition: WorkflowDefinition = parse_definition(content)?;

        for step in &definition.steps {
            if step.kind == StepKind::Unknown {
                return Err(AppError::Validation(format!(
                    "Step '{}' has an unrecognized type",
                    step.id
                )));
            }
            if step.kind == StepKind::Action {
                let spec = step
                    .config
                    .get("action")
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "Step '{}' is missing its action",
                            step.id
                        ))
                    })?;
                let spec: ActionSpec = serde_json::from_value(spec)?;
                spec.validate()?;
            }
        }

        let doc = self
            .store
            .create(WORKFLOWS_COLLECTION, serde_json::to_value(&definition)?)
            .await?;
        tracing::info!(workflow_id = %doc.id, name = %definition.name, "Workflow registered");
        Ok(doc)
    }

    /// Register an automation rule.
    pub async fn register_rule(&self, content: &str) -> AppResult<Document> {
        let rule: RuleDefinition = parse_definition(content)?;
        for spec in &rule.actions {
            spec.validate()?;
        }

        let doc = self
            .store
            .create(RULES_COLLECTION, serde_json::to_value(&rule)?)
            .await?;
        tracing::info!(rule_id = %doc.id, name = %rule.name, "Rule registered");
        Ok(doc)
    }

    /// Register a points rule.
    pub async fn register_points_rule(&self, content: &str) -> AppResult<Document> {
        let rule: PointsRule = parse_definition(content)?;
        if rule.trigger.trim().is_empty() {
            return Err(AppError::Validation(
                "Points rule requires a trigger key".to_string(),
            ));
        }

        let doc = self
            .store
            .create(POINTS_RULES_COLLECTION, serde_json::to_value(&rule)?)
            .await?;
        tracing::info!(rule_id = %doc.id, trigger = %rule.trigger, "Points rule registered");
        Ok(doc)
    }

    /// List workflow definitions.
    pub async fn list_workflows(&self) -> AppResult<Vec<Document>> {
        Ok(self.store.query(WORKFLOWS_COLLECTION, &[]).await?)
    }

    /// List automation rules.
    pub async fn list_rules(&self) -> AppResult<Vec<Document>> {
        Ok(self.store.query(RULES_COLLECTION, &[]).await?)
    }

    /// List points rules.
    pub async fn list_points_rules(&self) -> AppResult<Vec<Document>> {
        Ok(self.store.query(POINTS_RULES_COLLECTION, &[]).await?)
    }

    /// Run a registered workflow by id.
    pub async fn run_workflow(
        &self,
        id: &str,
        request: RunWorkflowRequest,
    ) -> AppResult<ExecutionResult> {
        let doc = self.store.get(WORKFLOWS_COLLECTION, id).await?;
        let mut definition: WorkflowDefinition = doc
            .parse()
            .map_err(|e| AppError::Internal(format!("Stored workflow is corrupt: {e}")))?;
        definition.id = doc.id;

        self.workflows
            .run(&definition, request.context, request.initiated_by.as_deref())
            .await
    }

    /// Score an activity event against the points rules.
    pub async fn score(&self, request: ScoreRequest) -> AppResult<PointsOutcome> {
        self.points
            .score(&request.member_id, &request.trigger, &request.activity)
            .await
    }
}

/// Parse YAML or JSON content into a definition type.
///
/// YAML is a superset of JSON, so one parser covers both.
fn parse_definition<T: serde::de::DeserializeOwned>(content: &str) -> AppResult<T> {
    serde_yaml::from_str(content).map_err(|e| AppError::Parse(format!("Invalid definition: {e}")))
}
