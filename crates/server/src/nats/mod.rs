//! NATS JetStream integration for the Quorum server.
//!
//! Provides outbound change-event publishing for external consumers.

pub mod publisher;

pub use publisher::ChangePublisher;
