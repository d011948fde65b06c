//! Service layer for the Quorum server.
//!
//! Services encapsulate business logic and coordinate
//! between handlers and the document store.

pub mod automation;
pub mod document;
pub mod dues;
pub mod execution;
pub mod member;
pub mod notification;

pub use automation::AutomationService;
pub use document::DocumentService;
pub use dues::DuesService;
pub use execution::ExecutionService;
pub use member::MemberService;
pub use notification::NotificationService;
