//! Completion/failure notifications retained per session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Whether a notification reports a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A completion/failure notification for one terminal task or workflow.
///
/// Unlike updates, notifications are retained in the per-session store
/// regardless of live-delivery outcome, so a client that reconnects can
/// fetch the ones it missed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionNotification {
    /// Unique within the session's live notification list.
    pub id: String,

    /// Session this notification belongs to.
    pub session_id: String,

    /// Project the session was subscribed with, if any.
    pub project_id: Option<String>,

    /// Success or error.
    pub kind: NotificationKind,

    /// Short headline, e.g. `"Task completed"`.
    pub title: String,

    /// Human-readable detail line.
    pub message: String,

    /// When the notification was created (UTC).
    pub created_at: Timestamp,

    /// Explicit expiry. Absent means `created_at + notification TTL`.
    pub expires_at: Option<Timestamp>,

    /// Set by an explicit dismiss action; dismissed entries are hidden
    /// from default listings but survive until they expire.
    pub dismissed: bool,
}

/// Process-wide counter folded into generated ids so that two
/// notifications for the same entity created within the same
/// millisecond still get distinct ids.
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

impl ProductionNotification {
    /// Create a notification for a terminal entity.
    ///
    /// The id is derived from the entity id plus creation time plus a
    /// process-wide sequence number, making it collision-safe within
    /// the lifetime of one process.
    pub fn new(
        session_id: impl Into<String>,
        project_id: Option<String>,
        entity_id: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let created_at = Utc::now();
        let seq = NOTIFICATION_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("{entity_id}-{}-{seq}", created_at.timestamp_millis()),
            session_id: session_id.into(),
            project_id,
            kind,
            title: title.into(),
            message: message.into(),
            created_at,
            expires_at: None,
            dismissed: false,
        }
    }

    /// Override the default TTL-based expiry with an explicit instant.
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether this notification is still live at `now`.
    ///
    /// Survives if the explicit `expires_at` is in the future, or --
    /// when no explicit expiry is set -- if `created_at + ttl` is in
    /// the future. Used as a pure filter by the store's lazy pruning;
    /// surviving entries are never mutated.
    pub fn is_live(&self, now: Timestamp, ttl: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => {
                let Ok(ttl) = chrono::Duration::from_std(ttl) else {
                    // TTL too large to represent: never expires.
                    return true;
                };
                match self.created_at.checked_add_signed(ttl) {
                    Some(expiry) => expiry > now,
                    None => true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: NotificationKind) -> ProductionNotification {
        ProductionNotification::new(
            "s1",
            Some("p1".into()),
            "tk-1",
            kind,
            "Task completed",
            "Task tk-1 finished",
        )
    }

    #[test]
    fn ids_are_unique_for_same_entity_and_instant() {
        let a = sample(NotificationKind::Success);
        let b = sample(NotificationKind::Success);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fresh_notification_is_live() {
        let n = sample(NotificationKind::Success);
        assert!(n.is_live(Utc::now(), Duration::from_secs(3600)));
    }

    #[test]
    fn notification_older_than_ttl_is_not_live() {
        let mut n = sample(NotificationKind::Error);
        n.created_at = Utc::now() - chrono::Duration::milliseconds(3_600_001);
        assert!(!n.is_live(Utc::now(), Duration::from_secs(3600)));
    }

    #[test]
    fn explicit_expiry_wins_over_ttl() {
        let past = Utc::now() - chrono::Duration::seconds(1);
        let n = sample(NotificationKind::Success).with_expiry(past);
        // TTL alone would keep it alive, but the explicit expiry has passed.
        assert!(!n.is_live(Utc::now(), Duration::from_secs(3600)));
    }
}
