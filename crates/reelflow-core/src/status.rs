//! Normalized status vocabulary shared by both job systems.
//!
//! The task queue reports upper-case Celery-style states (`PENDING`,
//! `STARTED`, `SUCCESS`, ...) while the workflow engine reports
//! lower-case states (`running`, `completed`, `failed`). Normalization
//! lower-cases everything; the helpers here classify the result.

/// Event name for a normalized status update pushed over a live channel.
pub const EVENT_PRODUCTION_UPDATE: &str = "production_update";

/// Event name for a completion/failure notification pushed over a live channel.
pub const EVENT_PRODUCTION_NOTIFICATION: &str = "production_notification";

/// Source tag for updates originating from the task-queue adapter.
pub const SOURCE_CELERY: &str = "celery";

/// Source tag for updates originating from the workflow-engine adapter.
pub const SOURCE_LANGGRAPH: &str = "langgraph";

/// Statuses after which an entity will never report progress again.
///
/// Both synonym pairs are intentional: the task queue says
/// `success`/`failure`, the workflow engine says `completed`/`failed`.
const TERMINAL_STATUSES: [&str; 4] = ["success", "completed", "failure", "failed"];

/// Whether a status (in any casing) means no further progress will occur.
pub fn is_terminal(status: &str) -> bool {
    TERMINAL_STATUSES
        .iter()
        .any(|t| status.eq_ignore_ascii_case(t))
}

/// Whether a terminal status represents a failure.
///
/// Only meaningful when [`is_terminal`] already returned `true`.
pub fn is_failure(status: &str) -> bool {
    status.eq_ignore_ascii_case("failure") || status.eq_ignore_ascii_case("failed")
}

/// Coarse buckets used by the status summary aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Classify a normalized status into a summary bucket.
///
/// Anything that is neither pending nor terminal (`started`, `retry`,
/// `running`, `progress`, ...) counts as running.
pub fn classify(status: &str) -> StatusBucket {
    if status.eq_ignore_ascii_case("pending") {
        StatusBucket::Pending
    } else if is_failure(status) {
        StatusBucket::Failed
    } else if is_terminal(status) {
        StatusBucket::Completed
    } else {
        StatusBucket::Running
    }
}
