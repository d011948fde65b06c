//! Reactive automation rules.
//!
//! The rule engine subscribes to the document change feed. For every change
//! it loads the enabled rules, filters them by trigger scope, evaluates
//! their conditions against the changed document, and runs the actions of
//! each matching rule in order. A failing rule never stops the others: the
//! failure is logged, recorded, and evaluation continues.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;

use quorum_actions::{ActionContext, ActionRegistry, ActionSpec};
use quorum_store::{ChangeEvent, DocumentStore};

use crate::engine::evaluator::{evaluate_conditions, Condition, LogicOp};
use crate::error::AppResult;
use crate::result_ext::ResultExt;

/// Collection holding rule definitions.
pub const RULES_COLLECTION: &str = "automation_rules";

/// Append-only collection of rule execution records.
pub const RULE_EXECUTIONS_COLLECTION: &str = "rule_executions";

/// Collections the engines write to themselves, including the point awards
/// produced by the `award_points` action. Changes to these never trigger
/// rules, so a rule cannot feed back into its own bookkeeping or award
/// writes. A rule whose action writes to an ordinary collection can still
/// cascade into other rules watching that collection.
const INTERNAL_COLLECTIONS: &[&str] = &[
    RULES_COLLECTION,
    RULE_EXECUTIONS_COLLECTION,
    super::workflow::EXECUTIONS_COLLECTION,
    quorum_actions::POINT_AWARDS_COLLECTION,
];

/// A registered automation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Rule identifier. Populated from the backing document on load.
    #[serde(default)]
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Disabled rules are skipped without evaluation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Collection this rule watches. Absent means every collection.
    #[serde(default, alias = "triggerCollection")]
    pub trigger_collection: Option<String>,

    /// Conditions evaluated against the changed document.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// How the conditions combine.
    #[serde(default, alias = "logicOperator")]
    pub logic: LogicOp,

    /// Actions dispatched in order when the rule matches.
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

fn default_enabled() -> bool {
    true
}

impl RuleDefinition {
    /// Whether this rule applies to a change in `collection`.
    pub fn watches(&self, collection: &str) -> bool {
        match &self.trigger_collection {
            Some(scope) => scope == collection,
            None => true,
        }
    }
}

/// Evaluates automation rules against document changes.
pub struct RuleEngine {
    store: Arc<dyn DocumentStore>,
    actions: Arc<ActionRegistry>,
}

impl RuleEngine {
    /// Create an engine bound to a store and an action registry.
    pub fn new(store: Arc<dyn DocumentStore>, actions: Arc<ActionRegistry>) -> Self {
        Self { store, actions }
    }

    /// Consume a change feed receiver until the channel closes.
    ///
    /// Lagged receivers resubscribe at the current position; the skipped
    /// events are logged and lost to this consumer.
    pub async fn run(&self, mut rx: broadcast::Receiver<ChangeEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let _ = self
                        .handle_change(&event)
                        .await
                        .log(format!("rule evaluation for {}", event.collection));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Rule engine lagged behind the change feed");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change feed closed, rule engine stopping");
                    break;
                }
            }
        }
    }

    /// Evaluate every applicable rule against one change event.
    ///
    /// Returns the number of rules that matched. Rule failures are isolated:
    /// each failure is logged and recorded, and the remaining rules still
    /// run.
    pub async fn handle_change(&self, event: &ChangeEvent) -> AppResult<usize> {
        if INTERNAL_COLLECTIONS.contains(&event.collection.as_str()) {
            return Ok(0);
        }

        let rules = self.load_rules().await?;
        let mut matched = 0;

        for rule in &rules {
            if !rule.enabled || !rule.watches(&event.collection) {
                continue;
            }
            if !evaluate_conditions(&rule.conditions, rule.logic, &event.document) {
                continue;
            }
            matched += 1;

            tracing::info!(
                rule_id = %rule.id,
                collection = %event.collection,
                document_id = %event.document_id,
                "Rule matched"
            );

            let _ = self
                .fire(rule, event)
                .await
                .log(format!("rule '{}'", rule.id));
        }

        Ok(matched)
    }

    /// Load every rule definition from the store.
    ///
    /// Definitions that fail to parse are logged and skipped so one corrupt
    /// rule cannot take the engine down.
    pub async fn load_rules(&self) -> AppResult<Vec<RuleDefinition>> {
        let docs = self.store.query(RULES_COLLECTION, &[]).await?;
        let mut rules = Vec::with_capacity(docs.len());
        for doc in docs {
            match doc.parse::<RuleDefinition>() {
                Ok(mut rule) => {
                    rule.id = doc.id;
                    rules.push(rule);
                }
                Err(e) => {
                    tracing::warn!(rule_id = %doc.id, error = %e, "Skipping unparseable rule");
                }
            }
        }
        Ok(rules)
    }

    /// Run a matched rule's actions in order and append its execution record.
    async fn fire(&self, rule: &RuleDefinition, event: &ChangeEvent) -> AppResult<()> {
        let ctx = ActionContext::for_rule(
            &event.collection,
            &event.document_id,
            &event.document,
            &rule.id,
        );

        let mut results: Vec<serde_json::Value> = Vec::with_capacity(rule.actions.len());
        let mut failure: Option<String> = None;

        for (index, spec) in rule.actions.iter().enumerate() {
            match self.actions.execute(spec, &ctx).await {
                Ok(output) => results.push(json!({
                    "action": spec.kind.as_str(),
                    "status": "completed",
                    "output": output,
                })),
                Err(e) => {
                    results.push(json!({
                        "action": spec.kind.as_str(),
                        "status": "failed",
                        "error": e.to_string(),
                    }));
                    failure = Some(format!("action {index} ({}) failed: {e}", spec.kind.as_str()));
                    break;
                }
            }
        }

        let record = json!({
            "rule_id": rule.id,
            "rule_name": rule.name,
            "collection": event.collection,
            "document_id": event.document_id,
            "change": event.kind,
            "conditions": rule.conditions,
            "status": if failure.is_some() { "failed" } else { "completed" },
            "results": results,
            "error": failure,
            "executed_at": chrono::Utc::now(),
        });
        self.store.create(RULE_EXECUTIONS_COLLECTION, record).await?;

        match failure {
            Some(cause) => Err(crate::error::AppError::Internal(cause)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_actions::LogMailer;
    use quorum_store::{ChangeKind, MemoryStore};

    fn engine() -> (Arc<MemoryStore>, RuleEngine) {
        let store = Arc::new(MemoryStore::new());
        let actions = Arc::new(ActionRegistry::builtin(
            store.clone() as Arc<dyn DocumentStore>,
            Arc::new(LogMailer),
        ));
        let engine = RuleEngine::new(store.clone() as Arc<dyn DocumentStore>, actions);
        (store, engine)
    }

    async fn register_rule(store: &MemoryStore, rule: serde_json::Value) -> String {
        store.create(RULES_COLLECTION, rule).await.unwrap().id
    }

    fn change(collection: &str, document: serde_json::Value) -> ChangeEvent {
        ChangeEvent {
            collection: collection.to_string(),
            document_id: "d-1".to_string(),
            kind: ChangeKind::Created,
            document,
        }
    }

    #[tokio::test]
    async fn test_matching_rule_fires_and_records() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "big dues alert",
                "trigger_collection": "dues",
                "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100}
                ],
                "actions": [
                    {"type": "create_record", "collection": "alerts", "data": {"kind": "big_dues"}}
                ]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("dues", json!({"amount": 150})))
            .await
            .unwrap();

        assert_eq!(matched, 1);
        assert_eq!(store.count("alerts").await, 1);

        let records = store.query(RULE_EXECUTIONS_COLLECTION, &[]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data["status"], json!("completed"));
        assert_eq!(records[0].data["collection"], json!("dues"));
    }

    #[tokio::test]
    async fn test_non_matching_conditions_skip_rule() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "big dues alert",
                "trigger_collection": "dues",
                "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100}
                ],
                "actions": [
                    {"type": "create_record", "collection": "alerts", "data": {}}
                ]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("dues", json!({"amount": 50})))
            .await
            .unwrap();

        assert_eq!(matched, 0);
        assert_eq!(store.count("alerts").await, 0);
        assert_eq!(store.count(RULE_EXECUTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_disabled_and_out_of_scope_rules_skipped() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "disabled",
                "enabled": false,
                "actions": [{"type": "create_record", "collection": "alerts", "data": {}}]
            }),
        )
        .await;
        register_rule(
            &store,
            json!({
                "name": "other collection",
                "trigger_collection": "members",
                "actions": [{"type": "create_record", "collection": "alerts", "data": {}}]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("dues", json!({"amount": 1})))
            .await
            .unwrap();

        assert_eq!(matched, 0);
        assert_eq!(store.count("alerts").await, 0);
    }

    #[tokio::test]
    async fn test_wildcard_scope_matches_any_collection() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "audit everything",
                "actions": [{"type": "create_record", "collection": "audit", "data": {}}]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("documents", json!({"title": "minutes"})))
            .await
            .unwrap();

        assert_eq!(matched, 1);
        assert_eq!(store.count("audit").await, 1);
    }

    #[tokio::test]
    async fn test_failing_rule_does_not_block_others() {
        let (store, engine) = engine();
        // Rule A fails: update_field targets a document that does not exist
        register_rule(
            &store,
            json!({
                "name": "broken",
                "trigger_collection": "dues",
                "actions": [{
                    "type": "update_field",
                    "collection": "members",
                    "documentId": "missing",
                    "field": "status",
                    "value": "active"
                }]
            }),
        )
        .await;
        // Rule B still runs
        register_rule(
            &store,
            json!({
                "name": "working",
                "trigger_collection": "dues",
                "actions": [{"type": "create_record", "collection": "alerts", "data": {}}]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("dues", json!({"amount": 10})))
            .await
            .unwrap();

        assert_eq!(matched, 2);
        assert_eq!(store.count("alerts").await, 1);

        let records = store.query(RULE_EXECUTIONS_COLLECTION, &[]).await.unwrap();
        assert_eq!(records.len(), 2);
        let statuses: Vec<&str> = records
            .iter()
            .map(|r| r.data["status"].as_str().unwrap())
            .collect();
        assert!(statuses.contains(&"failed"));
        assert!(statuses.contains(&"completed"));
    }

    #[tokio::test]
    async fn test_logic_operator_field_name_combines_with_or() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "either threshold",
                "trigger_collection": "dues",
                "logicOperator": "OR",
                "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100},
                    {"field": "type", "operator": "equals", "value": "donation"}
                ],
                "actions": [
                    {"type": "create_record", "collection": "alerts", "data": {}}
                ]
            }),
        )
        .await;

        // Only the second condition holds; OR must still match
        let matched = engine
            .handle_change(&change("dues", json!({"amount": 10, "type": "donation"})))
            .await
            .unwrap();

        assert_eq!(matched, 1);
        assert_eq!(store.count("alerts").await, 1);
    }

    #[tokio::test]
    async fn test_award_writes_do_not_retrigger_rules() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "award on anything",
                "actions": [
                    {"type": "award_points", "memberId": "m-1", "points": 5}
                ]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("members", json!({"name": "Ada"})))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let awards = store
            .query(quorum_actions::POINT_AWARDS_COLLECTION, &[])
            .await
            .unwrap();
        assert_eq!(awards.len(), 1);

        // Replay the award write as a change event: the wildcard rule must
        // not fire again on its own output
        let matched = engine
            .handle_change(&change(
                quorum_actions::POINT_AWARDS_COLLECTION,
                awards[0].data.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(matched, 0);
        assert_eq!(
            store.count(quorum_actions::POINT_AWARDS_COLLECTION).await,
            1
        );
    }

    #[tokio::test]
    async fn test_internal_collections_never_trigger() {
        let (store, engine) = engine();
        register_rule(
            &store,
            json!({
                "name": "audit everything",
                "actions": [{"type": "create_record", "collection": "audit", "data": {}}]
            }),
        )
        .await;

        for collection in INTERNAL_COLLECTIONS {
            let matched = engine
                .handle_change(&change(collection, json!({"x": 1})))
                .await
                .unwrap();
            assert_eq!(matched, 0, "{collection} should not trigger rules");
        }
    }

    #[tokio::test]
    async fn test_unparseable_rule_skipped() {
        let (store, engine) = engine();
        // conditions must be an array; this rule cannot parse
        register_rule(&store, json!({"name": "corrupt", "conditions": 42})).await;
        register_rule(
            &store,
            json!({
                "name": "fine",
                "actions": [{"type": "create_record", "collection": "audit", "data": {}}]
            }),
        )
        .await;

        let matched = engine
            .handle_change(&change("dues", json!({"amount": 1})))
            .await
            .unwrap();
        assert_eq!(matched, 1);
    }
}
