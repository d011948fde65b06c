//! Quorum Action Library
//!
//! The side-effect catalog shared by the workflow and rule engines. Each
//! action performs at most one write against the document store (or one
//! delivery to the mail relay) per invocation; the dispatcher never batches
//! and never retries.
//!
//! ## Modules
//!
//! - [`spec`]: Action descriptors (`ActionSpec`/`ActionKind`), validated at
//!   construction
//! - [`registry`]: The `Action` trait and dispatch registry
//! - [`actions`]: Built-in actions (`send_email`, `update_field`,
//!   `create_record`, `award_points`)
//! - [`mailer`]: Notification delivery transport
//! - [`context`]: Invocation context handed to actions
//! - [`error`]: Action error types

pub mod actions;
pub mod context;
pub mod error;
pub mod mailer;
pub mod registry;
pub mod spec;

pub use context::ActionContext;
pub use error::ActionError;
pub use mailer::{EmailMessage, LogMailer, Mailer, WebhookMailer};
pub use registry::{Action, ActionRegistry};
pub use spec::{ActionKind, ActionSpec};

/// Collection that `award_points` writes award records into.
pub const POINT_AWARDS_COLLECTION: &str = "point_awards";
