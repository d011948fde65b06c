//! Notification service.
//!
//! Delivery goes through the same `send_email` action the engines use, so
//! direct sends and rule-driven sends share one transport and one
//! fire-and-forget semantic.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use quorum_actions::{ActionContext, ActionKind, ActionRegistry, ActionSpec};
use quorum_store::{Document, DocumentStore};

use crate::error::AppResult;

/// Collection holding the notification log.
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

/// Request body for sending a notification.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    /// Recipient address.
    pub to: String,

    /// Subject line.
    #[serde(default)]
    pub subject: String,

    /// Message body.
    #[serde(default, alias = "message")]
    pub body: String,
}

/// Service for notification operations.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn DocumentStore>,
    actions: Arc<ActionRegistry>,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(store: Arc<dyn DocumentStore>, actions: Arc<ActionRegistry>) -> Self {
        Self { store, actions }
    }

    /// Send a notification and log it.
    ///
    /// Delivery failures do not fail the request; the log entry records
    /// whether delivery was acknowledged.
    pub async fn send(&self, request: SendNotificationRequest) -> AppResult<Document> {
        let spec = ActionSpec::new(
            ActionKind::SendEmail,
            json!({
                "to": request.to,
                "subject": request.subject,
                "body": request.body,
            }),
        );
        let ack = self.actions.execute(&spec, &ActionContext::default()).await?;

        let doc = self
            .store
            .create(
                NOTIFICATIONS_COLLECTION,
                json!({
                    "to": request.to,
                    "subject": request.subject,
                    "delivered": ack.get("delivered").cloned().unwrap_or(json!(false)),
                    "sent_at": chrono::Utc::now(),
                }),
            )
            .await?;

        Ok(doc)
    }

    /// List the notification log.
    pub async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.store.query(NOTIFICATIONS_COLLECTION, &[]).await?)
    }
}
