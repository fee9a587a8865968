//! Per-session notification list with lazy TTL pruning.

use std::time::Duration;

use chrono::Utc;

use reelflow_core::notification::ProductionNotification;

/// Bounded history of completion/failure notifications for one session.
///
/// Append-only until entries are dismissed or expire. Pruning runs
/// lazily on every append and is a pure filter: surviving entries are
/// never mutated.
#[derive(Default)]
pub struct NotificationStore {
    entries: Vec<ProductionNotification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification, then drop every entry whose expiry (or
    /// TTL-derived expiry) has passed.
    pub fn push(&mut self, notification: ProductionNotification, ttl: Duration) {
        self.entries.push(notification);
        let now = Utc::now();
        self.entries.retain(|n| n.is_live(now, ttl));
    }

    /// List notifications, oldest first.
    ///
    /// Dismissed entries are hidden unless `include_read` is set.
    pub fn list(&self, include_read: bool) -> Vec<ProductionNotification> {
        self.entries
            .iter()
            .filter(|n| include_read || !n.dismissed)
            .cloned()
            .collect()
    }

    /// Mark the matching entry as dismissed. Unknown ids are a no-op.
    pub fn dismiss(&mut self, notification_id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|n| n.id == notification_id) {
            entry.dismissed = true;
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelflow_core::notification::NotificationKind;

    const TTL: Duration = Duration::from_millis(3_600_000);

    fn notification(entity_id: &str) -> ProductionNotification {
        ProductionNotification::new(
            "s1",
            None,
            entity_id,
            NotificationKind::Success,
            "Task completed",
            "done",
        )
    }

    #[test]
    fn push_then_list() {
        let mut store = NotificationStore::new();
        store.push(notification("tk-1"), TTL);
        store.push(notification("tk-2"), TTL);

        let listed = store.list(false);
        assert_eq!(listed.len(), 2);
        assert!(listed[0].id.starts_with("tk-1"));
    }

    #[test]
    fn push_prunes_expired_entries() {
        let mut store = NotificationStore::new();
        let mut stale = notification("tk-old");
        stale.created_at = Utc::now() - chrono::Duration::milliseconds(3_600_001);
        store.push(stale, TTL);
        store.push(notification("tk-new"), TTL);

        // The stale entry must be gone even from the include_read view.
        let all = store.list(true);
        assert_eq!(all.len(), 1);
        assert!(all[0].id.starts_with("tk-new"));
    }

    #[test]
    fn dismissed_entries_hidden_by_default() {
        let mut store = NotificationStore::new();
        store.push(notification("tk-1"), TTL);
        let id = store.list(false)[0].id.clone();

        store.dismiss(&id);

        assert!(store.list(false).is_empty());
        let all = store.list(true);
        assert_eq!(all.len(), 1);
        assert!(all[0].dismissed);
    }

    #[test]
    fn dismiss_unknown_id_is_noop() {
        let mut store = NotificationStore::new();
        store.push(notification("tk-1"), TTL);

        store.dismiss("nonexistent");

        let all = store.list(true);
        assert_eq!(all.len(), 1);
        assert!(!all[0].dismissed);
    }

    #[test]
    fn clear_empties_the_list() {
        let mut store = NotificationStore::new();
        store.push(notification("tk-1"), TTL);
        store.clear();
        assert!(store.list(true).is_empty());
    }
}
