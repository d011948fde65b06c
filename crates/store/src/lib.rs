//! Quorum Document Store
//!
//! Shared persistence layer for the Quorum organization backend. Every
//! collection (members, dues, documents, automation definitions, execution
//! records) is stored as an untyped JSON document behind the [`DocumentStore`]
//! trait, so engines receive an explicit store handle and tests run against
//! the in-memory implementation.
//!
//! ## Modules
//!
//! - [`document`]: The `Document` envelope with server-assigned timestamps
//! - [`store`]: The `DocumentStore` trait and query filters
//! - [`memory`]: In-memory store for tests and single-process deployments
//! - [`postgres`]: PostgreSQL-backed store (single JSONB table)
//! - [`changes`]: Change events, the subscription feed, and `WatchedStore`
//! - [`error`]: Store error types

pub mod changes;
pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use changes::{ChangeEvent, ChangeFeed, ChangeKind, ChangeSource, WatchedStore};
pub use document::Document;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use store::{DocumentStore, QueryFilter, StoreResult};
