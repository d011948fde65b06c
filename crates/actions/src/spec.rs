//! Action descriptors.
//!
//! An `ActionSpec` is the persisted shape of one configured side effect:
//! a kind tag plus an opaque configuration object. Configuration is
//! validated when a definition is registered, not when the action runs, so
//! malformed rules are rejected before they can fail mid-execution.
//! Unrecognized configuration fields are ignored.

use serde::{Deserialize, Serialize};

use crate::actions::{
    AwardPointsConfig, CreateRecordConfig, SendEmailConfig, UpdateFieldConfig,
};
use crate::error::ActionError;

/// The closed catalog of action types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Deliver a notification through the mail relay.
    SendEmail,
    /// Write one field on an existing document.
    UpdateField,
    /// Create a new document.
    CreateRecord,
    /// Create a point-award record for a member.
    AwardPoints,
    /// Anything else; always an error at dispatch time.
    #[serde(other)]
    Unknown,
}

impl ActionKind {
    /// Catalog name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendEmail => "send_email",
            Self::UpdateField => "update_field",
            Self::CreateRecord => "create_record",
            Self::AwardPoints => "award_points",
            Self::Unknown => "unknown",
        }
    }
}

/// One configured side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Action type.
    #[serde(rename = "type", alias = "kind")]
    pub kind: ActionKind,

    /// Type-specific configuration.
    #[serde(flatten)]
    pub config: serde_json::Value,
}

impl ActionSpec {
    /// Build a spec from a kind and a configuration object.
    pub fn new(kind: ActionKind, config: serde_json::Value) -> Self {
        Self { kind, config }
    }

    /// Validate the configuration for this spec's kind.
    ///
    /// Checks that every required key is present and well-typed. Called when
    /// a rule or workflow definition is registered; the dispatcher performs
    /// the same parse again at execution time, so a spec that skipped
    /// validation still fails before any write.
    pub fn validate(&self) -> Result<(), ActionError> {
        match self.kind {
            ActionKind::SendEmail => {
                SendEmailConfig::parse(&self.config)?;
            }
            ActionKind::UpdateField => {
                UpdateFieldConfig::parse(&self.config)?;
            }
            ActionKind::CreateRecord => {
                CreateRecordConfig::parse(&self.config)?;
            }
            ActionKind::AwardPoints => {
                AwardPointsConfig::parse(&self.config)?;
            }
            ActionKind::Unknown => {
                return Err(ActionError::UnknownAction(
                    "action type not in catalog".to_string(),
                ));
            }
        }
        Ok(())
    }
}
