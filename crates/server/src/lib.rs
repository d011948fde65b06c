//! Quorum Server Library
//!
//! This crate provides the HTTP backend for Quorum, an organization
//! management service, handling:
//!
//! - **Roster and Records**: Members, dues, documents, and notifications
//! - **Workflow Automation**: Multi-step workflows run on demand
//! - **Reactive Rules**: Rules evaluated against every document change
//! - **Points Scoring**: Weighted, condition-gated point awards
//! - **Execution History**: Append-only workflow and rule execution records
//!
//! ## Architecture
//!
//! Every record is an untyped JSON document behind the `DocumentStore`
//! trait (PostgreSQL or in-memory). Writes go through a watched store that
//! publishes change events on an in-process feed; the rule engine consumes
//! that feed, and an optional NATS publisher mirrors it for external
//! consumers.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`engine`]: Condition evaluator and the workflow/rule/points engines
//! - [`error`]: Custom error types with Axum integration
//! - [`handlers`]: HTTP route handlers
//! - [`services`]: Business logic between handlers and the store
//! - [`state`]: Shared application state

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod nats;
pub mod result_ext;
pub mod services;
pub mod state;

pub use error::{AppError, AppResult};
pub use result_ext::ResultExt;
