//! The single update shape both job systems are normalized into.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// What kind of entity an update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Workflow,
}

impl EntityKind {
    /// The `type` tag carried on the wire (`task_update` / `workflow_update`).
    pub fn update_type(self) -> &'static str {
        match self {
            EntityKind::Task => "task_update",
            EntityKind::Workflow => "workflow_update",
        }
    }
}

/// A normalized status update for one tracked task or workflow.
///
/// Transient: produced during a poll tick, pushed over the session's
/// live channel, never persisted. Constructed via
/// [`ProductionUpdate::new`] and enriched with the builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionUpdate {
    /// Wire tag: `task_update` or `workflow_update`.
    #[serde(rename = "type")]
    pub update_type: String,

    /// Origin adapter tag (`celery` or `langgraph`).
    pub source: String,

    /// Id of the task or workflow this update describes.
    pub entity_id: String,

    /// Whether the entity is a task or a workflow.
    pub entity_type: EntityKind,

    /// Normalized lower-case status string.
    pub status: String,

    /// Completion percentage (0-100). Absent means "progress unknown",
    /// which is distinct from 0% done and never defaulted.
    pub progress: Option<f64>,

    /// Human-readable progress text or current step, if known.
    pub message: Option<String>,

    /// Opaque payload (raw result or metadata). Not interpreted here;
    /// downstream consumers decide what it means.
    pub data: serde_json::Value,

    /// When the update was normalized (UTC).
    pub timestamp: Timestamp,
}

impl ProductionUpdate {
    /// Create an update with only the required fields.
    ///
    /// `progress`, `message` default to absent and `data` to `null`.
    pub fn new(
        source: impl Into<String>,
        entity_id: impl Into<String>,
        entity_type: EntityKind,
        status: impl Into<String>,
    ) -> Self {
        Self {
            update_type: entity_type.update_type().to_string(),
            source: source.into(),
            entity_id: entity_id.into(),
            entity_type,
            status: status.into(),
            progress: None,
            message: None,
            data: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    /// Attach a completion percentage.
    pub fn with_progress(mut self, progress: Option<f64>) -> Self {
        self.progress = progress;
        self
    }

    /// Attach a progress message / current step.
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Attach the opaque result/metadata payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_update_has_empty_optional_fields() {
        let update = ProductionUpdate::new("celery", "tk-1", EntityKind::Task, "pending");
        assert_eq!(update.update_type, "task_update");
        assert_eq!(update.source, "celery");
        assert_eq!(update.entity_id, "tk-1");
        assert!(update.progress.is_none());
        assert!(update.message.is_none());
        assert!(update.data.is_null());
    }

    #[test]
    fn workflow_updates_carry_workflow_type_tag() {
        let update = ProductionUpdate::new("langgraph", "wf-1", EntityKind::Workflow, "running");
        assert_eq!(update.update_type, "workflow_update");
    }

    #[test]
    fn serializes_type_field_name() {
        let update = ProductionUpdate::new("celery", "tk-1", EntityKind::Task, "started");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "task_update");
        assert_eq!(json["entity_type"], "task");
    }
}
