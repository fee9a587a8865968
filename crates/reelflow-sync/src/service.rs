//! Session-scoped sync service.
//!
//! [`SyncService`] owns all per-session state: which task and workflow
//! ids each session watches, its notification history, and its live
//! delivery channel. It is constructed once at startup with the two
//! status sources and shared via `Arc` across the API surface and the
//! polling loops.
//!
//! Every mutating operation tolerates an unknown session id as a quiet
//! no-op: a tick that resolves after `unsubscribe` finds no entry and
//! its results fall away, which is the intended cancellation semantics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use reelflow_adapters::source::{TaskStatusSource, WorkflowStatusSource};
use reelflow_core::config::SyncConfig;
use reelflow_core::notification::{NotificationKind, ProductionNotification};
use reelflow_core::status::{self, StatusBucket};
use reelflow_core::types::Timestamp;
use reelflow_core::update::{EntityKind, ProductionUpdate};

use crate::channel::{self, DeliveryChannel};
use crate::normalize;
use crate::scheduler::PollingLoops;
use crate::store::NotificationStore;
use crate::summary::{StatusSummary, TaskStatusCounts, WorkflowStatusCounts};

/// Watch-list bookkeeping for one session.
///
/// A tracked id is, by construction, not yet known to be terminal: the
/// poll cycle that first observes a terminal status removes the id and
/// synthesizes its notification in the same critical section.
struct SyncSubscription {
    project_id: Option<String>,
    /// Tracked task ids, insertion-ordered, no duplicates.
    task_ids: Vec<String>,
    /// Tracked workflow ids, same semantics.
    workflow_ids: Vec<String>,
    /// Advanced only when a poll cycle produces at least one update;
    /// monotonically non-decreasing.
    last_update: Timestamp,
}

/// Everything the service holds for one subscribed session.
struct SessionEntry {
    subscription: SyncSubscription,
    store: NotificationStore,
    channel: Option<Arc<dyn DeliveryChannel>>,
    loops: PollingLoops,
}

/// Multi-source status aggregation and real-time fan-out.
pub struct SyncService {
    config: SyncConfig,
    tasks: Arc<dyn TaskStatusSource>,
    workflows: Arc<dyn WorkflowStatusSource>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    /// Parent of every session's loop token -- not cancelled by
    /// `cleanup` so the service stays usable afterwards.
    cancel: CancellationToken,
}

impl SyncService {
    /// Create a service polling the given sources.
    pub fn new(
        config: SyncConfig,
        tasks: Arc<dyn TaskStatusSource>,
        workflows: Arc<dyn WorkflowStatusSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            tasks,
            workflows,
            sessions: RwLock::new(HashMap::new()),
            cancel: CancellationToken::new(),
        })
    }

    pub(crate) fn config(&self) -> &SyncConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Subscription registry
    // -----------------------------------------------------------------

    /// Subscribe a session, starting its two polling loops.
    ///
    /// Idempotent: re-subscribing an already-subscribed session does
    /// not restart loops or clear tracked ids. A supplied `channel`
    /// always replaces the session's registered channel, so a
    /// reconnecting client can re-attach without resubscribing.
    pub async fn subscribe(
        self: &Arc<Self>,
        session_id: &str,
        project_id: Option<String>,
        channel: Option<Arc<dyn DeliveryChannel>>,
    ) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) => {
                if let Some(channel) = channel {
                    entry.channel = Some(channel);
                    tracing::debug!(session_id, "Channel re-registered for existing session");
                }
            }
            None => {
                let loops = PollingLoops::start(
                    Arc::clone(self),
                    session_id.to_string(),
                    self.cancel.child_token(),
                );
                sessions.insert(
                    session_id.to_string(),
                    SessionEntry {
                        subscription: SyncSubscription {
                            project_id,
                            task_ids: Vec::new(),
                            workflow_ids: Vec::new(),
                            last_update: Utc::now(),
                        },
                        store: NotificationStore::new(),
                        channel,
                        loops,
                    },
                );
                tracing::info!(session_id, "Session subscribed");
            }
        }
    }

    /// Tear down a session: stop both loops, drop its subscription,
    /// notification list, and channel. No-op for unknown sessions.
    pub async fn unsubscribe(&self, session_id: &str) {
        let removed = self.sessions.write().await.remove(session_id);
        if let Some(entry) = removed {
            tracing::info!(session_id, "Session unsubscribed");
            entry.loops.shutdown().await;
        }
    }

    /// Whether a subscription currently exists for the session.
    pub async fn is_subscribed(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Start watching a task. Silently dropped when the session is not
    /// subscribed -- tracking before subscribing is a caller ordering
    /// bug that must not take the service down.
    pub async fn track_task(&self, session_id: &str, task_id: &str) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) => {
                let ids = &mut entry.subscription.task_ids;
                if !ids.iter().any(|id| id == task_id) {
                    ids.push(task_id.to_string());
                }
            }
            None => {
                tracing::debug!(session_id, task_id, "Track for unsubscribed session, dropped");
            }
        }
    }

    /// Stop watching a task. No-op when absent.
    pub async fn untrack_task(&self, session_id: &str, task_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.subscription.task_ids.retain(|id| id != task_id);
        }
    }

    /// Start watching a workflow. Same semantics as [`Self::track_task`].
    pub async fn track_workflow(&self, session_id: &str, workflow_id: &str) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) => {
                let ids = &mut entry.subscription.workflow_ids;
                if !ids.iter().any(|id| id == workflow_id) {
                    ids.push(workflow_id.to_string());
                }
            }
            None => {
                tracing::debug!(
                    session_id,
                    workflow_id,
                    "Track for unsubscribed session, dropped",
                );
            }
        }
    }

    /// Stop watching a workflow. No-op when absent.
    pub async fn untrack_workflow(&self, session_id: &str, workflow_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.subscription.workflow_ids.retain(|id| id != workflow_id);
        }
    }

    /// Snapshot of the session's tracked task ids.
    pub async fn tracked_tasks(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|e| e.subscription.task_ids.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the session's tracked workflow ids.
    pub async fn tracked_workflows(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|e| e.subscription.workflow_ids.clone())
            .unwrap_or_default()
    }

    /// When the session's polling last produced an update.
    pub async fn last_update(&self, session_id: &str) -> Option<Timestamp> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|e| e.subscription.last_update)
    }

    // -----------------------------------------------------------------
    // Poll ticks
    // -----------------------------------------------------------------

    /// One task-queue poll cycle for a session.
    ///
    /// Invoked by the session's task loop; public so tests can drive
    /// cycles directly. Polls up to `batch_size` tracked ids
    /// sequentially; a failing id is logged and skipped without
    /// aborting the batch.
    pub async fn poll_tasks_tick(&self, session_id: &str) {
        let Some(batch) = self.task_batch(session_id).await else {
            return;
        };

        let mut updates = Vec::new();
        for task_id in &batch {
            match self.tasks.get_task_status(task_id).await {
                Ok(Some(payload)) => updates.push(normalize::task_update(task_id, &payload)),
                Ok(None) => {
                    tracing::debug!(session_id, task_id, "Task unknown to queue, skipping");
                }
                Err(e) => {
                    tracing::warn!(session_id, task_id, error = %e, "Task status poll failed");
                }
            }
        }

        self.finish_tick(session_id, updates).await;
    }

    /// One workflow-engine poll cycle for a session.
    pub async fn poll_workflows_tick(&self, session_id: &str) {
        let Some(batch) = self.workflow_batch(session_id).await else {
            return;
        };

        let mut updates = Vec::new();
        for workflow_id in &batch {
            match self.workflows.get_workflow_status(workflow_id).await {
                Ok(payload) => updates.push(normalize::workflow_update(workflow_id, &payload)),
                Err(e) => {
                    tracing::warn!(
                        session_id,
                        workflow_id,
                        error = %e,
                        "Workflow status poll failed",
                    );
                }
            }
        }

        self.finish_tick(session_id, updates).await;
    }

    /// First `batch_size` tracked task ids, or `None` when there is
    /// nothing to poll (no subscription or empty set).
    async fn task_batch(&self, session_id: &str) -> Option<Vec<String>> {
        let sessions = self.sessions.read().await;
        let ids = &sessions.get(session_id)?.subscription.task_ids;
        if ids.is_empty() {
            return None;
        }
        Some(ids.iter().take(self.config.batch_size).cloned().collect())
    }

    async fn workflow_batch(&self, session_id: &str) -> Option<Vec<String>> {
        let sessions = self.sessions.read().await;
        let ids = &sessions.get(session_id)?.subscription.workflow_ids;
        if ids.is_empty() {
            return None;
        }
        Some(ids.iter().take(self.config.batch_size).cloned().collect())
    }

    /// Apply a tick's updates: untrack terminal entities, synthesize
    /// their notifications, advance `last_update`, then dispatch.
    ///
    /// All state mutations happen under one write-lock acquisition so a
    /// terminal id can never survive in the tracked set after its
    /// notification exists. Dispatch happens after the lock is
    /// released. If the session vanished while the adapter calls were
    /// in flight, everything is silently dropped.
    async fn finish_tick(&self, session_id: &str, updates: Vec<ProductionUpdate>) {
        if updates.is_empty() {
            return;
        }

        let mut notifications = Vec::new();
        let channel = {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(session_id) else {
                tracing::debug!(session_id, "Session gone mid-tick, dropping results");
                return;
            };

            for update in &updates {
                if status::is_terminal(&update.status) {
                    // Untrack, and notify only if the id was still
                    // tracked: a concurrent cycle that already handled
                    // this terminal status must not notify twice.
                    let ids = match update.entity_type {
                        EntityKind::Task => &mut entry.subscription.task_ids,
                        EntityKind::Workflow => &mut entry.subscription.workflow_ids,
                    };
                    let before = ids.len();
                    ids.retain(|id| id != &update.entity_id);
                    if ids.len() == before {
                        continue;
                    }

                    let notification = synthesize_notification(
                        session_id,
                        entry.subscription.project_id.clone(),
                        update,
                    );
                    entry
                        .store
                        .push(notification.clone(), self.config.notification_ttl);
                    notifications.push(notification);

                    tracing::info!(
                        session_id,
                        entity_id = %update.entity_id,
                        status = %update.status,
                        "Tracked entity reached terminal status",
                    );
                }
            }

            entry.subscription.last_update = Utc::now();
            entry.channel.clone()
        };

        for notification in &notifications {
            channel::send_notification(session_id, channel.as_ref(), notification).await;
        }
        channel::send_updates(session_id, channel.as_ref(), &updates).await;
    }

    // -----------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------

    /// Append a notification to a session's store, push it over the
    /// live channel if one is connected, then prune expired entries.
    /// No-op for unknown sessions.
    pub async fn add_notification(&self, session_id: &str, notification: ProductionNotification) {
        let channel = {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(session_id) else {
                return;
            };
            entry
                .store
                .push(notification.clone(), self.config.notification_ttl);
            entry.channel.clone()
        };
        channel::send_notification(session_id, channel.as_ref(), &notification).await;
    }

    /// List a session's notifications, oldest first. Dismissed entries
    /// are hidden unless `include_read`. Unknown sessions yield an
    /// empty list.
    pub async fn get_notifications(
        &self,
        session_id: &str,
        include_read: bool,
    ) -> Vec<ProductionNotification> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|e| e.store.list(include_read))
            .unwrap_or_default()
    }

    /// Mark a notification dismissed. Unknown session or id: no-op.
    pub async fn dismiss_notification(&self, session_id: &str, notification_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.store.dismiss(notification_id);
        }
    }

    /// Drop all of a session's notifications.
    pub async fn clear_notifications(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.store.clear();
        }
    }

    // -----------------------------------------------------------------
    // Status summary
    // -----------------------------------------------------------------

    /// Point-in-time status counts across everything the session
    /// tracks, re-polling every id. `None` unless the session is
    /// subscribed with a project. Ids whose status call fails are
    /// logged and excluded; partial results are acceptable.
    pub async fn get_status_summary(&self, session_id: &str) -> Option<StatusSummary> {
        let (task_ids, workflow_ids, last_updated) = {
            let sessions = self.sessions.read().await;
            let entry = sessions.get(session_id)?;
            entry.subscription.project_id.as_ref()?;
            (
                entry.subscription.task_ids.clone(),
                entry.subscription.workflow_ids.clone(),
                entry.subscription.last_update,
            )
        };

        let mut tasks = TaskStatusCounts::default();
        for task_id in &task_ids {
            match self.tasks.get_task_status(task_id).await {
                Ok(Some(payload)) => match status::classify(&payload.status) {
                    StatusBucket::Pending => tasks.pending += 1,
                    StatusBucket::Running => tasks.running += 1,
                    StatusBucket::Completed => tasks.completed += 1,
                    StatusBucket::Failed => tasks.failed += 1,
                },
                Ok(None) => {
                    tracing::debug!(session_id, task_id, "Task unknown to queue, excluded");
                }
                Err(e) => {
                    tracing::warn!(session_id, task_id, error = %e, "Summary task poll failed");
                }
            }
        }

        let mut workflows = WorkflowStatusCounts::default();
        for workflow_id in &workflow_ids {
            match self.workflows.get_workflow_status(workflow_id).await {
                Ok(payload) => match status::classify(&payload.status) {
                    StatusBucket::Failed => workflows.failed += 1,
                    StatusBucket::Completed => workflows.completed += 1,
                    // The engine has no pending state; anything
                    // non-terminal counts as running.
                    StatusBucket::Pending | StatusBucket::Running => workflows.running += 1,
                },
                Err(e) => {
                    tracing::warn!(
                        session_id,
                        workflow_id,
                        error = %e,
                        "Summary workflow poll failed",
                    );
                }
            }
        }

        Some(StatusSummary {
            tasks,
            workflows,
            last_updated,
        })
    }

    // -----------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------

    /// Stop every session's loops and clear all state. Wired to process
    /// shutdown; safe to call with no sessions.
    pub async fn cleanup(&self) {
        let entries: Vec<(String, SessionEntry)> =
            self.sessions.write().await.drain().collect();
        let count = entries.len();
        for (session_id, entry) in entries {
            tracing::debug!(session_id = %session_id, "Stopping session loops");
            entry.loops.shutdown().await;
        }
        tracing::info!(count, "Sync service cleaned up");
    }
}

/// Build the notification for a terminal update.
fn synthesize_notification(
    session_id: &str,
    project_id: Option<String>,
    update: &ProductionUpdate,
) -> ProductionNotification {
    let failed = status::is_failure(&update.status);
    let entity = match update.entity_type {
        EntityKind::Task => "Task",
        EntityKind::Workflow => "Workflow",
    };
    let title = if failed {
        format!("{entity} failed")
    } else {
        format!("{entity} completed")
    };
    let message = update.message.clone().unwrap_or_else(|| {
        format!(
            "{entity} {} finished with status {}",
            update.entity_id, update.status
        )
    });

    ProductionNotification::new(
        session_id,
        project_id,
        &update.entity_id,
        if failed {
            NotificationKind::Error
        } else {
            NotificationKind::Success
        },
        title,
        message,
    )
}
