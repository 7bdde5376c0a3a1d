use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use prehospital_storage::activity::{self, NewActivity};

use crate::error::AuditError;

/// A structured audit event for an action taken through the API.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub user_id: Option<i64>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            user_id: None,
            details: None,
        }
    }

    pub fn resource(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        info!(
            audit.action = %self.action,
            audit.resource_type = %self.resource_type,
            audit.resource_id = self.resource_id.as_deref().unwrap_or("-"),
            audit.user_id = self.user_id,
            "audit event"
        );
    }

    /// Emit the event and append it to the activity log.
    pub fn record(&self, conn: &Connection, now: jiff::Timestamp) -> Result<i64, AuditError> {
        self.emit();
        let id = activity::insert(
            conn,
            &NewActivity {
                user_id: self.user_id,
                action: &self.action,
                resource_type: &self.resource_type,
                resource_id: self.resource_id.as_deref(),
                details: self.details.as_ref(),
            },
            now,
        )?;
        Ok(id)
    }
}
