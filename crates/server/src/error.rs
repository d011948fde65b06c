//! Error types for the Quorum server.
//!
//! This module provides custom error types that implement `IntoResponse`
//! for seamless integration with Axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors for the server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] quorum_store::StoreError),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate resource)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// NATS messaging error
    #[error("NATS error: {0}")]
    Nats(String),

    /// Action execution error
    #[error("Action error: {0}")]
    Action(#[from] quorum_actions::ActionError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Parse error (YAML, JSON, etc.)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Store(e) => {
                if let quorum_store::StoreError::NotFound { .. } = e {
                    (StatusCode::NOT_FOUND, e.to_string())
                } else {
                    tracing::error!(error = %e, "Store error");
                    (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
                }
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Nats(msg) => {
                tracing::error!(error = %msg, "NATS error");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::Action(e) => {
                if let quorum_actions::ActionError::InvalidConfiguration(_)
                | quorum_actions::ActionError::UnknownAction(_) = e
                {
                    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
                } else {
                    tracing::error!(error = %e, "Action error");
                    (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
                }
            }
            AppError::Serialization(e) => {
                tracing::error!(error = %e, "Serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Parse(msg) => {
                tracing::error!(error = %msg, "Parse error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<envy::Error> for AppError {
    fn from(err: envy::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = AppError::NotFound("Member not found".to_string());
        assert_eq!(err.to_string(), "Resource not found: Member not found");
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation("Workflow is not active".to_string());
        assert_eq!(err.to_string(), "Validation error: Workflow is not active");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AppError = quorum_store::StoreError::not_found("members", "m-1").into();
        assert!(matches!(err, AppError::Store(_)));
    }
}
