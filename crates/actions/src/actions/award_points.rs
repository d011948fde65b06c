//! Point award action.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quorum_store::DocumentStore;

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::registry::Action;
use crate::spec::ActionSpec;
use crate::POINT_AWARDS_COLLECTION;

/// Configuration for `award_points`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardPointsConfig {
    /// Member receiving the award.
    #[serde(alias = "memberId")]
    pub member_id: String,

    /// Points awarded. May be fractional or negative; no clamping happens
    /// here.
    pub points: f64,

    /// Optional free-text reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Optional provenance: the rules that produced this award (set by the
    /// points engine on aggregated awards).
    #[serde(skip_serializing_if = "Option::is_none", alias = "appliedRules")]
    pub applied_rules: Option<serde_json::Value>,
}

impl AwardPointsConfig {
    /// Parse and validate the configuration object.
    pub fn parse(config: &serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(config.clone())
            .map_err(|e| ActionError::InvalidConfiguration(format!("award_points: {}", e)))
    }
}

/// Creates a point-award record for a member.
pub struct AwardPointsAction {
    store: Arc<dyn DocumentStore>,
}

impl AwardPointsAction {
    /// Create the action over a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for AwardPointsAction {
    fn name(&self) -> &'static str {
        "award_points"
    }

    async fn execute(
        &self,
        spec: &ActionSpec,
        ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let config = AwardPointsConfig::parse(&spec.config)?;

        let mut record = serde_json::json!({
            "member_id": config.member_id,
            "points": config.points,
        });
        if let Some(reason) = &config.reason {
            record["reason"] = serde_json::json!(reason);
        }
        if let Some(applied) = &config.applied_rules {
            record["applied_rules"] = applied.clone();
        }
        if let Some(rule_id) = &ctx.rule_id {
            record["rule_id"] = serde_json::json!(rule_id);
        }

        let doc = self.store.create(POINT_AWARDS_COLLECTION, record).await?;

        tracing::debug!(
            member_id = %config.member_id,
            points = config.points,
            award_id = %doc.id,
            "Points awarded"
        );

        Ok(serde_json::json!({
            "award_id": doc.id,
            "member_id": config.member_id,
            "points": config.points,
        }))
    }
}
