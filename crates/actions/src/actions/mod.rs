//! Built-in action implementations.

mod award_points;
mod create_record;
mod send_email;
mod update_field;

pub use award_points::{AwardPointsAction, AwardPointsConfig};
pub use create_record::{CreateRecordAction, CreateRecordConfig};
pub use send_email::{SendEmailAction, SendEmailConfig};
pub use update_field::{UpdateFieldAction, UpdateFieldConfig};
