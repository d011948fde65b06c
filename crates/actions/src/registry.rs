//! Action registry and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use quorum_store::DocumentStore;

use crate::actions::{AwardPointsAction, CreateRecordAction, SendEmailAction, UpdateFieldAction};
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::mailer::Mailer;
use crate::spec::{ActionKind, ActionSpec};

/// Trait for implementing executable actions.
#[async_trait]
pub trait Action: Send + Sync {
    /// The action's catalog name.
    fn name(&self) -> &'static str;

    /// Execute the action with the given spec and invocation context.
    ///
    /// Returns the action's result payload. At most one external write
    /// happens per invocation; configuration errors surface before any
    /// write does.
    async fn execute(
        &self,
        spec: &ActionSpec,
        ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError>;
}

/// Registry of available actions.
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Create a registry with the built-in catalog registered.
    pub fn builtin(store: Arc<dyn DocumentStore>, mailer: Arc<dyn Mailer>) -> Self {
        let mut registry = Self::new();
        registry.register(SendEmailAction::new(mailer));
        registry.register(UpdateFieldAction::new(store.clone()));
        registry.register(CreateRecordAction::new(store.clone()));
        registry.register(AwardPointsAction::new(store));
        registry
    }

    /// Register an action.
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.actions.insert(action.name().to_string(), Arc::new(action));
    }

    /// Get an action by catalog name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// List registered action names.
    pub fn list(&self) -> Vec<&str> {
        self.actions.keys().map(|s| s.as_str()).collect()
    }

    /// Execute the action named by the spec's kind.
    pub async fn execute(
        &self,
        spec: &ActionSpec,
        ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError> {
        if spec.kind == ActionKind::Unknown {
            return Err(ActionError::UnknownAction(
                "action type not in catalog".to_string(),
            ));
        }

        let action = self
            .get(spec.kind.as_str())
            .ok_or_else(|| ActionError::UnknownAction(spec.kind.as_str().to_string()))?;

        tracing::debug!(action = action.name(), "Executing action");
        action.execute(spec, ctx).await
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
