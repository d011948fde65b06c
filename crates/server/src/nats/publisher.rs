//! NATS change-event publisher.
//!
//! The in-process change feed drives the rule engine; this publisher
//! mirrors the same events onto a JetStream subject so external consumers
//! (dashboards, sync jobs) can react without talking to the server API.
//! It is optional: the server is fully functional without NATS.

use std::sync::Arc;

use async_nats::jetstream::{self, Context};
use thiserror::Error;
use tokio::sync::broadcast;

use quorum_store::ChangeEvent;

/// Default NATS subject for change events.
pub const DEFAULT_SUBJECT: &str = "quorum.changes";

/// Default JetStream stream name.
pub const DEFAULT_STREAM: &str = "quorum_changes";

/// Errors that can occur during NATS operations.
#[derive(Debug, Error)]
pub enum NatsError {
    #[error("JetStream error: {0}")]
    JetStream(String),

    #[error("Publish error: {0}")]
    Publish(String),
}

/// NATS JetStream publisher for document change events.
#[derive(Clone)]
pub struct ChangePublisher {
    /// JetStream context.
    js: Context,

    /// Subject to publish to.
    subject: String,
}

impl ChangePublisher {
    /// Create a new change publisher from an existing client.
    ///
    /// Ensures the JetStream stream exists before returning.
    pub async fn new(
        client: Arc<async_nats::Client>,
        subject: Option<&str>,
        stream_name: Option<&str>,
    ) -> Result<Self, NatsError> {
        let subject = subject.unwrap_or(DEFAULT_SUBJECT).to_string();
        let stream = stream_name.unwrap_or(DEFAULT_STREAM);

        let js = jetstream::new((*client).clone());
        Self::ensure_stream(&js, stream, &subject).await?;

        Ok(Self { js, subject })
    }

    /// Ensure the JetStream stream exists.
    async fn ensure_stream(js: &Context, stream: &str, subject: &str) -> Result<(), NatsError> {
        match js.get_stream(stream).await {
            Ok(_) => {
                tracing::debug!(stream = %stream, "Using existing NATS stream");
                Ok(())
            }
            Err(_) => {
                let config = jetstream::stream::Config {
                    name: stream.to_string(),
                    subjects: vec![subject.to_string()],
                    max_age: std::time::Duration::from_secs(3600), // 1 hour retention
                    storage: jetstream::stream::StorageType::File,
                    ..Default::default()
                };

                js.create_stream(config)
                    .await
                    .map_err(|e| NatsError::JetStream(e.to_string()))?;

                tracing::info!(stream = %stream, subject = %subject, "Created NATS stream");
                Ok(())
            }
        }
    }

    /// Publish one change event.
    pub async fn publish(&self, event: &ChangeEvent) -> Result<(), NatsError> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| NatsError::Publish(format!("Serialization error: {}", e)))?;

        self.js
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| NatsError::Publish(e.to_string()))?
            .await
            .map_err(|e| NatsError::Publish(e.to_string()))?;

        tracing::debug!(
            collection = %event.collection,
            document_id = %event.document_id,
            "Published change event"
        );

        Ok(())
    }

    /// Forward events from a change feed receiver until the channel closes.
    ///
    /// Publish failures are logged and do not stop the forwarder; external
    /// delivery is best-effort.
    pub async fn forward(&self, mut rx: broadcast::Receiver<ChangeEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.publish(&event).await {
                        tracing::warn!(error = %e, "Failed to publish change event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change publisher lagged behind the feed");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change feed closed, publisher stopping");
                    break;
                }
            }
        }
    }
}
