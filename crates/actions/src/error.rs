//! Action execution error types.

use thiserror::Error;

/// Errors that can occur during action execution.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Action type not in the catalog.
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// Required configuration key absent or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Document store write failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Notification delivery failed.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<quorum_store::StoreError> for ActionError {
    fn from(e: quorum_store::StoreError) -> Self {
        ActionError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(e: serde_json::Error) -> Self {
        ActionError::Json(e.to_string())
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(e: reqwest::Error) -> Self {
        ActionError::Delivery(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ActionError::UnknownAction("teleport".to_string());
        assert_eq!(err.to_string(), "Unknown action type: teleport");

        let err = ActionError::InvalidConfiguration("missing 'documentId'".to_string());
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_error_from_store() {
        let store_err = quorum_store::StoreError::not_found("members", "m-1");
        let err: ActionError = store_err.into();
        assert!(matches!(err, ActionError::Store(_)));
    }
}
