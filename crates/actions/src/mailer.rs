//! Notification delivery transport.
//!
//! The `send_email` action hands messages to a `Mailer`; actual transport is
//! an external concern. The webhook mailer posts to a relay endpoint, the
//! log mailer is the default for development and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// An outbound notification message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address or member reference.
    pub to: String,

    /// Message subject.
    pub subject: String,

    /// Message body.
    pub body: String,
}

/// Delivery transport for notification messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &EmailMessage) -> Result<(), ActionError>;
}

/// Mailer that only logs; used in development and tests.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ActionError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery (log only)"
        );
        Ok(())
    }
}

/// Mailer that posts messages to an HTTP relay endpoint.
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

impl WebhookMailer {
    /// Create a mailer posting to `url`.
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ActionError> {
        let response = self.client.post(&self.url).json(message).send().await?;

        if !response.status().is_success() {
            return Err(ActionError::Delivery(format!(
                "Mail relay returned {}",
                response.status()
            )));
        }

        tracing::debug!(to = %message.to, "Email handed to relay");
        Ok(())
    }
}
