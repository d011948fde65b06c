//! Application state for the Quorum server.
//!
//! This module defines the shared application state that is
//! passed to handlers via Axum's state management.

use std::sync::Arc;

use quorum_actions::ActionRegistry;
use quorum_store::{ChangeFeed, DocumentStore};

use crate::config::AppConfig;

/// Shared application state.
///
/// Holds the explicit document-store handle every engine entry point
/// receives, plus the change feed and action registry.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle (writes through here feed the change feed)
    pub store: Arc<dyn DocumentStore>,

    /// Change feed the rule engine subscribes to
    pub feed: ChangeFeed,

    /// Action registry (the side-effect catalog)
    pub actions: Arc<ActionRegistry>,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// NATS client (optional)
    pub nats: Option<Arc<async_nats::Client>>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        feed: ChangeFeed,
        actions: Arc<ActionRegistry>,
        config: AppConfig,
        nats: Option<async_nats::Client>,
    ) -> Self {
        Self {
            store,
            feed,
            actions,
            config: Arc::new(config),
            nats: nats.map(Arc::new),
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if NATS is configured and connected.
    pub fn has_nats(&self) -> bool {
        self.nats.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_actions::LogMailer;
    use quorum_store::MemoryStore;

    #[test]
    fn test_state_construction() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let actions = Arc::new(ActionRegistry::builtin(
            store.clone(),
            Arc::new(LogMailer),
        ));
        let state = AppState::new(
            store,
            ChangeFeed::new(),
            actions,
            AppConfig::default(),
            None,
        );

        assert!(!state.has_nats());
        assert!(state.uptime_seconds() < 2);
    }
}
