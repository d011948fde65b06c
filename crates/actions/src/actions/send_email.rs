//! Email notification action.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::mailer::{EmailMessage, Mailer};
use crate::registry::Action;
use crate::spec::ActionSpec;

/// Configuration for `send_email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailConfig {
    /// Recipient address or member reference.
    pub to: String,

    /// Message subject.
    #[serde(default)]
    pub subject: String,

    /// Message body.
    #[serde(default, alias = "message")]
    pub body: String,
}

impl SendEmailConfig {
    /// Parse and validate the configuration object.
    pub fn parse(config: &serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(config.clone())
            .map_err(|e| ActionError::InvalidConfiguration(format!("send_email: {}", e)))
    }
}

/// Hands a message to the mail relay.
///
/// Fire-and-forget: a delivery failure is logged and the caller still gets
/// acknowledgement metadata. Only a malformed configuration fails the
/// caller.
pub struct SendEmailAction {
    mailer: Arc<dyn Mailer>,
}

impl SendEmailAction {
    /// Create the action over a delivery transport.
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Action for SendEmailAction {
    fn name(&self) -> &'static str {
        "send_email"
    }

    async fn execute(
        &self,
        spec: &ActionSpec,
        _ctx: &ActionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let config = SendEmailConfig::parse(&spec.config)?;

        let message = EmailMessage {
            to: config.to.clone(),
            subject: config.subject.clone(),
            body: config.body.clone(),
        };

        let delivered = match self.mailer.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(to = %config.to, error = %e, "Email delivery failed");
                false
            }
        };

        Ok(serde_json::json!({
            "to": config.to,
            "subject": config.subject,
            "delivered": delivered,
            "queued_at": Utc::now(),
        }))
    }
}
