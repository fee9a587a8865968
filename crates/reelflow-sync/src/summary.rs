//! On-demand status summary types.

use serde::Serialize;

use reelflow_core::types::Timestamp;

/// Point-in-time counts across a session's tracked entities.
///
/// Computed fresh on every call by re-polling each tracked id; nothing
/// is cached. Ids whose status call fails are excluded from the counts.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub tasks: TaskStatusCounts,
    pub workflows: WorkflowStatusCounts,
    /// When the session's polling last produced an update.
    pub last_updated: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatusCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowStatusCounts {
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}
