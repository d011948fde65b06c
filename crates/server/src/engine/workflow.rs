//! On-demand workflow execution.
//!
//! A workflow is an ordered list of steps run strictly in sequence. Every
//! run writes an execution record before the first step starts and settles
//! it to a terminal state exactly once. A step failure aborts the run;
//! steps after the failed one never start.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use quorum_actions::{ActionContext, ActionRegistry, ActionSpec};
use quorum_store::DocumentStore;

use crate::engine::evaluator::{evaluate_conditions, Condition, LogicOp};
use crate::error::{AppError, AppResult};

/// Collection holding execution records.
pub const EXECUTIONS_COLLECTION: &str = "workflow_executions";

/// Lifecycle state of a workflow definition. Only active workflows run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Runnable.
    Active,
    /// Registered but not yet runnable.
    #[default]
    Draft,
    /// Retired; kept for execution history.
    Archived,
    /// Anything else; treated as not runnable.
    #[serde(other)]
    Unknown,
}

impl WorkflowStatus {
    /// Whether a workflow in this state accepts runs.
    pub fn is_runnable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Step type within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Records the run's starting point; produces a timestamp.
    Trigger,
    /// Evaluates conditions against the run context; never gates the run.
    Condition,
    /// Dispatches one catalog action.
    Action,
    /// Pauses the run for a configured number of milliseconds.
    Delay,
    /// Anything else; fails the step.
    #[serde(other)]
    Unknown,
}

impl StepKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Condition => "condition",
            Self::Action => "action",
            Self::Delay => "delay",
            Self::Unknown => "unknown",
        }
    }
}

/// One step of a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step identifier, unique within the workflow.
    pub id: String,

    /// Step type.
    #[serde(rename = "type", alias = "kind")]
    pub kind: StepKind,

    /// Type-specific configuration.
    #[serde(flatten)]
    pub config: serde_json::Value,
}

/// A registered workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow identifier. Populated from the backing document on load.
    #[serde(default)]
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Lifecycle state.
    #[serde(default)]
    pub status: WorkflowStatus,

    /// Ordered steps.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Terminal and in-flight run states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Steps are executing.
    Running,
    /// Every step completed.
    Completed,
    /// A step failed and the run aborted.
    Failed,
}

/// Per-step state recorded in the execution snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet reached.
    Pending,
    /// Finished successfully.
    Completed,
    /// Aborted the run.
    Failed,
}

/// Outcome of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Identifier of the persisted execution record.
    pub execution_id: String,

    /// Terminal status of the run.
    pub status: RunStatus,

    /// Per-step results in execution order.
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ConditionStepConfig {
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    logic: LogicOp,
}

#[derive(Debug, Deserialize)]
struct DelayStepConfig {
    #[serde(default = "default_delay_ms", alias = "delayMs")]
    delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize)]
struct ActionStepConfig {
    action: ActionSpec,
}

/// Executes workflow definitions against the document store.
pub struct WorkflowEngine {
    store: Arc<dyn DocumentStore>,
    actions: Arc<ActionRegistry>,
}

impl WorkflowEngine {
    /// Create an engine bound to a store and an action registry.
    pub fn new(store: Arc<dyn DocumentStore>, actions: Arc<ActionRegistry>) -> Self {
        Self { store, actions }
    }

    /// Run a workflow with the given trigger context.
    ///
    /// Rejects non-active workflows without writing a record. Otherwise an
    /// execution record is created as `running` with every step `pending`,
    /// the steps run in order, and the record is settled to `completed` or
    /// `failed`. A failed run surfaces a generic internal error; the cause
    /// is persisted on the record, not returned to the caller.
    pub async fn run(
        &self,
        workflow: &WorkflowDefinition,
        trigger: serde_json::Map<String, serde_json::Value>,
        initiator: Option<&str>,
    ) -> AppResult<ExecutionResult> {
        if !workflow.status.is_runnable() {
            return Err(AppError::Validation(format!(
                "Workflow '{}' is not active",
                workflow.id
            )));
        }

        let snapshot: Vec<serde_json::Value> = workflow
            .steps
            .iter()
            .map(|step| {
                json!({
                    "step_id": step.id,
                    "type": step.kind.as_str(),
                    "status": StepStatus::Pending,
                })
            })
            .collect();

        let record = self
            .store
            .create(
                EXECUTIONS_COLLECTION,
                json!({
                    "workflow_id": workflow.id,
                    "workflow_name": workflow.name,
                    "status": RunStatus::Running,
                    "started_at": chrono::Utc::now(),
                    "initiated_by": initiator,
                    "trigger": serde_json::Value::Object(trigger.clone()),
                    "steps": snapshot,
                    "results": [],
                }),
            )
            .await?;
        let execution_id = record.id;

        tracing::info!(
            workflow_id = %workflow.id,
            execution_id = %execution_id,
            steps = workflow.steps.len(),
            "Workflow run started"
        );

        let mut context = trigger;
        let mut results: Vec<serde_json::Value> = Vec::with_capacity(workflow.steps.len());

        for step in &workflow.steps {
            match self.run_step(step, &context).await {
                Ok(output) => {
                    // Object outputs fold into the running context; later
                    // steps see the merged view.
                    if let serde_json::Value::Object(fields) = &output {
                        for (key, value) in fields {
                            context.insert(key.clone(), value.clone());
                        }
                    }
                    results.push(json!({
                        "step_id": step.id,
                        "type": step.kind.as_str(),
                        "status": StepStatus::Completed,
                        "output": output,
                    }));
                }
                Err(err) => {
                    let cause = err.to_string();
                    tracing::error!(
                        workflow_id = %workflow.id,
                        execution_id = %execution_id,
                        step_id = %step.id,
                        error = %cause,
                        "Workflow step failed"
                    );
                    results.push(json!({
                        "step_id": step.id,
                        "type": step.kind.as_str(),
                        "status": StepStatus::Failed,
                        "error": cause,
                    }));
                    self.settle(&execution_id, RunStatus::Failed, &results, Some(&cause))
                        .await?;
                    return Err(AppError::Internal(
                        "Workflow execution failed".to_string(),
                    ));
                }
            }
        }

        self.settle(&execution_id, RunStatus::Completed, &results, None)
            .await?;

        tracing::info!(
            workflow_id = %workflow.id,
            execution_id = %execution_id,
            "Workflow run completed"
        );

        Ok(ExecutionResult {
            execution_id,
            status: RunStatus::Completed,
            results,
        })
    }

    async fn run_step(
        &self,
        step: &StepSpec,
        context: &serde_json::Map<String, serde_json::Value>,
    ) -> AppResult<serde_json::Value> {
        match step.kind {
            StepKind::Trigger => Ok(json!({ "triggered_at": chrono::Utc::now() })),
            StepKind::Condition => {
                let config: ConditionStepConfig = serde_json::from_value(step.config.clone())
                    .map_err(|e| AppError::Validation(format!("condition step: {e}")))?;
                let subject = serde_json::Value::Object(context.clone());
                let met = evaluate_conditions(&config.conditions, config.logic, &subject);
                Ok(json!({ "condition_met": met }))
            }
            StepKind::Action => {
                let config: ActionStepConfig = serde_json::from_value(step.config.clone())
                    .map_err(|e| AppError::Validation(format!("action step: {e}")))?;
                let output = self
                    .actions
                    .execute(&config.action, &ActionContext::for_workflow(context.clone()))
                    .await?;
                Ok(output)
            }
            StepKind::Delay => {
                let config: DelayStepConfig = serde_json::from_value(step.config.clone())
                    .map_err(|e| AppError::Validation(format!("delay step: {e}")))?;
                tokio::time::sleep(std::time::Duration::from_millis(config.delay_ms)).await;
                Ok(json!({ "delayed": config.delay_ms }))
            }
            StepKind::Unknown => Err(AppError::Validation(format!(
                "Step '{}' has an unrecognized type",
                step.id
            ))),
        }
    }

    async fn settle(
        &self,
        execution_id: &str,
        status: RunStatus,
        results: &[serde_json::Value],
        error: Option<&str>,
    ) -> AppResult<()> {
        let mut patch = json!({
            "status": status,
            "results": results,
            "completed_at": chrono::Utc::now(),
        });
        if let Some(cause) = error {
            patch["error"] = json!(cause);
        }
        self.store
            .update(EXECUTIONS_COLLECTION, execution_id, patch)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_actions::LogMailer;
    use quorum_store::MemoryStore;

    fn engine() -> (Arc<MemoryStore>, WorkflowEngine) {
        let store = Arc::new(MemoryStore::new());
        let actions = Arc::new(ActionRegistry::builtin(
            store.clone() as Arc<dyn DocumentStore>,
            Arc::new(LogMailer),
        ));
        let engine = WorkflowEngine::new(store.clone() as Arc<dyn DocumentStore>, actions);
        (store, engine)
    }

    fn workflow(status: WorkflowStatus, steps: serde_json::Value) -> WorkflowDefinition {
        serde_json::from_value(json!({
            "id": "wf-1",
            "name": "test workflow",
            "status": status,
            "steps": steps,
        }))
        .unwrap()
    }

    fn context(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_run_completes_with_ordered_results() {
        let (store, engine) = engine();
        let wf = workflow(
            WorkflowStatus::Active,
            json!([
                {"id": "s1", "type": "trigger"},
                {"id": "s2", "type": "delay", "delay_ms": 0},
                {"id": "s3", "type": "condition", "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100}
                ]},
                {"id": "s4", "type": "action", "action": {
                    "type": "create_record",
                    "collection": "audit",
                    "data": {"source": "workflow"}
                }},
            ]),
        );

        let outcome = engine
            .run(&wf, context(json!({"amount": 150})), Some("tester"))
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.results.len(), 4);
        let ids: Vec<&str> = outcome
            .results
            .iter()
            .map(|r| r["step_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4"]);
        assert_eq!(outcome.results[1]["output"]["delayed"], json!(0));
        assert_eq!(outcome.results[2]["output"]["condition_met"], json!(true));

        // Action step actually wrote
        assert_eq!(store.count("audit").await, 1);

        // Record settled terminal
        let record = store
            .get(EXECUTIONS_COLLECTION, &outcome.execution_id)
            .await
            .unwrap();
        assert_eq!(record.data["status"], json!("completed"));
        assert_eq!(record.data["initiated_by"], json!("tester"));
        assert!(record.data["completed_at"].is_string());
    }

    #[tokio::test]
    async fn test_inactive_workflow_rejected_without_record() {
        let (store, engine) = engine();
        let wf = workflow(WorkflowStatus::Draft, json!([{"id": "s1", "type": "trigger"}]));

        let result = engine.run(&wf, Default::default(), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.count(EXECUTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_step_failure_aborts_and_persists_cause() {
        let (store, engine) = engine();
        let wf = workflow(
            WorkflowStatus::Active,
            json!([
                {"id": "s1", "type": "trigger"},
                {"id": "s2", "type": "action", "action": {
                    "type": "update_field",
                    "collection": "members",
                    "field": "status"
                }},
                {"id": "s3", "type": "delay", "delay_ms": 0},
            ]),
        );

        let result = engine.run(&wf, Default::default(), None).await;

        // Caller sees a generic internal error
        match result {
            Err(AppError::Internal(msg)) => assert_eq!(msg, "Workflow execution failed"),
            other => panic!("expected internal error, got {other:?}"),
        }

        // Cause and partial results are on the record; s3 never ran
        let executions = store.query(EXECUTIONS_COLLECTION, &[]).await.unwrap();
        assert_eq!(executions.len(), 1);
        let record = &executions[0];
        assert_eq!(record.data["status"], json!("failed"));
        assert!(record.data["error"].as_str().unwrap().contains("documentId")
            || record.data["error"].as_str().is_some());
        let results = record.data["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["status"], json!("failed"));
    }

    #[tokio::test]
    async fn test_condition_false_does_not_gate() {
        let (_, engine) = engine();
        let wf = workflow(
            WorkflowStatus::Active,
            json!([
                {"id": "s1", "type": "condition", "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100}
                ]},
                {"id": "s2", "type": "delay", "delay_ms": 0},
            ]),
        );

        let outcome = engine
            .run(&wf, context(json!({"amount": 50})), None)
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0]["output"]["condition_met"], json!(false));
    }

    #[tokio::test]
    async fn test_step_outputs_merge_into_context() {
        let (store, engine) = engine();
        let wf = workflow(
            WorkflowStatus::Active,
            json!([
                {"id": "s1", "type": "trigger"},
                // triggered_at from s1 is now in context; condition sees it
                {"id": "s2", "type": "condition", "conditions": [
                    {"field": "triggered_at", "operator": "not_equals", "value": null}
                ]},
                {"id": "s3", "type": "action", "action": {
                    "type": "create_record",
                    "collection": "audit",
                    "data": {"checked": true}
                }},
            ]),
        );

        let outcome = engine.run(&wf, Default::default(), None).await.unwrap();
        assert_eq!(outcome.results[1]["output"]["condition_met"], json!(true));
        assert_eq!(store.count("audit").await, 1);
    }

    #[tokio::test]
    async fn test_unknown_step_kind_fails_run() {
        let (store, engine) = engine();
        let wf = workflow(
            WorkflowStatus::Active,
            json!([{"id": "s1", "type": "teleport"}]),
        );

        let result = engine.run(&wf, Default::default(), None).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let executions = store.query(EXECUTIONS_COLLECTION, &[]).await.unwrap();
        assert_eq!(executions[0].data["status"], json!("failed"));
    }

    #[test]
    fn test_delay_defaults_to_one_second() {
        let config: DelayStepConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.delay_ms, 1000);
    }

    #[test]
    fn test_workflow_status_runnable() {
        assert!(WorkflowStatus::Active.is_runnable());
        assert!(!WorkflowStatus::Draft.is_runnable());
        assert!(!WorkflowStatus::Archived.is_runnable());
        let status: WorkflowStatus = serde_json::from_str("\"paused\"").unwrap();
        assert!(!status.is_runnable());
    }
}
