//! Condition-gated point scoring.
//!
//! Points rules reuse the condition evaluator with a fixed AND combination.
//! Scoring one activity event accumulates `base * multiplier * weight`
//! across every matching rule and emits a single aggregated point award
//! carrying the applied rules as provenance. Totals are not clamped:
//! fractional and negative results pass through unmodified.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use quorum_actions::{ActionContext, ActionRegistry, ActionSpec};
use quorum_store::DocumentStore;

use crate::engine::evaluator::{evaluate_conditions, Condition, LogicOp};
use crate::error::AppResult;

/// Collection holding points-rule definitions.
pub const POINTS_RULES_COLLECTION: &str = "points_rules";

/// A registered points rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRule {
    /// Rule identifier. Populated from the backing document on load.
    #[serde(default)]
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Disabled rules are skipped without evaluation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Activity trigger key this rule scores (exact match).
    pub trigger: String,

    /// Conditions evaluated against the activity data, combined with AND.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Base point value.
    #[serde(default, alias = "base")]
    pub points: Option<f64>,

    /// Multiplier applied to the base.
    #[serde(default)]
    pub multiplier: Option<f64>,

    /// Weight applied to the product.
    #[serde(default)]
    pub weight: Option<f64>,
}

fn default_enabled() -> bool {
    true
}

impl PointsRule {
    /// Effective points for this rule: `base * multiplier * weight`.
    ///
    /// Missing and non-finite factors count as zero.
    pub fn effective_points(&self) -> f64 {
        factor(self.points) * factor(self.multiplier) * factor(self.weight)
    }
}

fn factor(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Provenance for one rule that contributed to a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRule {
    /// Rule identifier.
    pub rule_id: String,

    /// Rule name.
    pub name: String,

    /// Base point value after sanitization.
    pub base: f64,

    /// Multiplier after sanitization.
    pub multiplier: f64,

    /// Weight after sanitization.
    pub weight: f64,

    /// This rule's contribution to the total.
    pub points: f64,
}

/// Result of scoring one activity event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsOutcome {
    /// Sum of every applied rule's contribution. Unclamped.
    pub total_points: f64,

    /// The rules that matched, in evaluation order.
    pub applied_rules: Vec<AppliedRule>,
}

/// Scores activity events against the registered points rules.
pub struct PointsEngine {
    store: Arc<dyn DocumentStore>,
    actions: Arc<ActionRegistry>,
}

impl PointsEngine {
    /// Create an engine bound to a store and an action registry.
    pub fn new(store: Arc<dyn DocumentStore>, actions: Arc<ActionRegistry>) -> Self {
        Self { store, actions }
    }

    /// Score one activity event for a member.
    ///
    /// Loads the enabled rules whose trigger key equals `trigger`, evaluates
    /// each rule's conditions (AND) against `activity`, and accumulates the
    /// matching rules' points. When the total is nonzero, one aggregated
    /// point award is dispatched; a zero total emits nothing but still
    /// returns the outcome.
    pub async fn score(
        &self,
        member_id: &str,
        trigger: &str,
        activity: &serde_json::Value,
    ) -> AppResult<PointsOutcome> {
        let rules = self.load_rules().await?;

        let mut total = 0.0_f64;
        let mut applied: Vec<AppliedRule> = Vec::new();

        for rule in &rules {
            if !rule.enabled || rule.trigger != trigger {
                continue;
            }
            if !evaluate_conditions(&rule.conditions, LogicOp::And, activity) {
                continue;
            }

            let points = rule.effective_points();
            total += points;
            applied.push(AppliedRule {
                rule_id: rule.id.clone(),
                name: rule.name.clone(),
                base: factor(rule.points),
                multiplier: factor(rule.multiplier),
                weight: factor(rule.weight),
                points,
            });
        }

        if total != 0.0 {
            let spec = ActionSpec::new(
                quorum_actions::ActionKind::AwardPoints,
                json!({
                    "memberId": member_id,
                    "points": total,
                    "reason": format!("Scored trigger '{trigger}'"),
                    "appliedRules": &applied,
                }),
            );
            let ctx = ActionContext::for_workflow(
                activity.as_object().cloned().unwrap_or_default(),
            );
            self.actions.execute(&spec, &ctx).await?;

            tracing::info!(
                member_id,
                trigger,
                total_points = total,
                applied = applied.len(),
                "Point award emitted"
            );
        } else {
            tracing::debug!(member_id, trigger, "No points scored");
        }

        Ok(PointsOutcome {
            total_points: total,
            applied_rules: applied,
        })
    }

    async fn load_rules(&self) -> AppResult<Vec<PointsRule>> {
        let docs = self.store.query(POINTS_RULES_COLLECTION, &[]).await?;
        let mut rules = Vec::with_capacity(docs.len());
        for doc in docs {
            match doc.parse::<PointsRule>() {
                Ok(mut rule) => {
                    rule.id = doc.id;
                    rules.push(rule);
                }
                Err(e) => {
                    tracing::warn!(rule_id = %doc.id, error = %e, "Skipping unparseable points rule");
                }
            }
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_actions::{LogMailer, POINT_AWARDS_COLLECTION};
    use quorum_store::MemoryStore;

    fn engine() -> (Arc<MemoryStore>, PointsEngine) {
        let store = Arc::new(MemoryStore::new());
        let actions = Arc::new(ActionRegistry::builtin(
            store.clone() as Arc<dyn DocumentStore>,
            Arc::new(LogMailer),
        ));
        let engine = PointsEngine::new(store.clone() as Arc<dyn DocumentStore>, actions);
        (store, engine)
    }

    async fn register(store: &MemoryStore, rule: serde_json::Value) {
        store.create(POINTS_RULES_COLLECTION, rule).await.unwrap();
    }

    #[tokio::test]
    async fn test_weighted_accumulation_across_rules() {
        let (store, engine) = engine();
        register(
            &store,
            json!({"trigger": "attendance", "points": 10, "multiplier": 2, "weight": 1}),
        )
        .await;
        register(
            &store,
            json!({"trigger": "attendance", "points": 5, "multiplier": 1, "weight": 3}),
        )
        .await;

        let outcome = engine
            .score("m-1", "attendance", &json!({}))
            .await
            .unwrap();

        assert_eq!(outcome.total_points, 35.0);
        assert_eq!(outcome.applied_rules.len(), 2);

        // One aggregated award, not one per rule
        let awards = store.query(POINT_AWARDS_COLLECTION, &[]).await.unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].data["member_id"], json!("m-1"));
        assert_eq!(awards[0].data["points"], json!(35.0));
        assert_eq!(
            awards[0].data["applied_rules"].as_array().unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_conditions_gate_with_and() {
        let (store, engine) = engine();
        register(
            &store,
            json!({
                "trigger": "event",
                "points": 10, "multiplier": 1, "weight": 1,
                "conditions": [
                    {"field": "amount", "operator": "greater_than", "value": 100},
                    {"field": "type", "operator": "equals", "value": "income"}
                ]
            }),
        )
        .await;

        let hit = engine
            .score("m-1", "event", &json!({"amount": 150, "type": "income"}))
            .await
            .unwrap();
        assert_eq!(hit.total_points, 10.0);

        let miss = engine
            .score("m-1", "event", &json!({"amount": 50, "type": "income"}))
            .await
            .unwrap();
        assert_eq!(miss.total_points, 0.0);
        assert!(miss.applied_rules.is_empty());
    }

    #[tokio::test]
    async fn test_zero_total_emits_no_award() {
        let (store, engine) = engine();
        register(
            &store,
            json!({"trigger": "event", "points": 10, "multiplier": 0, "weight": 1}),
        )
        .await;

        let outcome = engine.score("m-1", "event", &json!({})).await.unwrap();

        // The rule matched, so provenance is present, but nothing is awarded
        assert_eq!(outcome.total_points, 0.0);
        assert_eq!(outcome.applied_rules.len(), 1);
        assert_eq!(store.count(POINT_AWARDS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_missing_factors_count_as_zero() {
        let (store, engine) = engine();
        register(&store, json!({"trigger": "event", "points": 10})).await;

        let outcome = engine.score("m-1", "event", &json!({})).await.unwrap();
        assert_eq!(outcome.total_points, 0.0);
        assert_eq!(store.count(POINT_AWARDS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_disabled_and_other_trigger_skipped() {
        let (store, engine) = engine();
        register(
            &store,
            json!({"trigger": "event", "enabled": false, "points": 10, "multiplier": 1, "weight": 1}),
        )
        .await;
        register(
            &store,
            json!({"trigger": "other", "points": 10, "multiplier": 1, "weight": 1}),
        )
        .await;

        let outcome = engine.score("m-1", "event", &json!({})).await.unwrap();
        assert_eq!(outcome.total_points, 0.0);
        assert!(outcome.applied_rules.is_empty());
    }

    #[tokio::test]
    async fn test_negative_total_passes_through() {
        let (store, engine) = engine();
        register(
            &store,
            json!({"trigger": "penalty", "points": -5, "multiplier": 1, "weight": 1}),
        )
        .await;

        let outcome = engine.score("m-1", "penalty", &json!({})).await.unwrap();
        assert_eq!(outcome.total_points, -5.0);

        let awards = store.query(POINT_AWARDS_COLLECTION, &[]).await.unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].data["points"], json!(-5.0));
    }

    #[test]
    fn test_effective_points_sanitizes_non_finite() {
        let rule = PointsRule {
            id: String::new(),
            name: String::new(),
            enabled: true,
            trigger: "t".to_string(),
            conditions: vec![],
            points: Some(f64::NAN),
            multiplier: Some(2.0),
            weight: Some(1.0),
        };
        assert_eq!(rule.effective_points(), 0.0);
    }
}
