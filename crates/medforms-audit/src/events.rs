use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "form.saved")]
    FormSaved,
    #[serde(rename = "form.deleted")]
    FormDeleted,
    #[serde(rename = "form.edit_started")]
    EditStarted,
    #[serde(rename = "form.submitted")]
    FormSubmitted,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormSaved => "form.saved",
            Self::FormDeleted => "form.deleted",
            Self::EditStarted => "form.edit_started",
            Self::FormSubmitted => "form.submitted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured audit event for a user-visible action.
///
/// `actor_role` is the role string supplied by the host (e.g. "doctor",
/// "admin"); the forms system has no user identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub actor_role: String,
    pub occurred_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        actor_role: impl Into<String>,
    ) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            actor_role: actor_role.into(),
            occurred_at: Timestamp::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        let details = self
            .details
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        info!(
            audit.action = %self.action,
            audit.resource_type = %self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.actor_role = %self.actor_role,
            audit.details = %details,
            "audit event"
        );
    }
}
