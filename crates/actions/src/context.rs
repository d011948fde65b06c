//! Invocation context handed to actions.

use serde::{Deserialize, Serialize};

/// Context for one action invocation.
///
/// Workflow steps pass their accumulated run context; the rule engine passes
/// the triggering document plus provenance. Actions read their required
/// parameters from the action configuration, not from here; the context is
/// carried for provenance and for actions that echo it into their output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// Collection of the triggering document (rule engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Identifier of the triggering document (rule engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Rule that dispatched this action (rule engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Free-form context values (workflow run context, or the triggering
    /// document's payload).
    #[serde(default)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl ActionContext {
    /// Context for a workflow step, carrying the accumulated run context.
    pub fn for_workflow(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Context for a rule firing on a document change.
    pub fn for_rule(
        collection: &str,
        document_id: &str,
        document: &serde_json::Value,
        rule_id: &str,
    ) -> Self {
        Self {
            collection: Some(collection.to_string()),
            document_id: Some(document_id.to_string()),
            rule_id: Some(rule_id.to_string()),
            values: document.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Look up a context value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }
}
