//! HTTP handlers for the Quorum API.
//!
//! This module contains all route handlers organized by domain.

pub mod automation;
pub mod documents;
pub mod dues;
pub mod executions;
pub mod health;
pub mod members;
pub mod notifications;

pub use health::{api_health, health_check};
