//! Best-effort delivery channel seam.
//!
//! A channel is whatever transport currently connects a session to its
//! client; the API crate backs it with a WebSocket sender. The sync
//! layer only needs "are you connected" and "send a named event".

use async_trait::async_trait;

use reelflow_core::notification::ProductionNotification;
use reelflow_core::status::{EVENT_PRODUCTION_NOTIFICATION, EVENT_PRODUCTION_UPDATE};
use reelflow_core::update::ProductionUpdate;

/// A send to a live channel failed (closed socket, serialization, ...).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ChannelError(String);

impl ChannelError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Live delivery handle for one session.
///
/// At most one channel is registered per session at a time. Sends are
/// fire-and-forget from the sync layer's perspective; a failure is
/// logged and never retried.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Whether the underlying transport is currently open.
    fn is_connected(&self) -> bool;

    /// Send a named event with a JSON payload.
    async fn send(&self, event: &str, payload: serde_json::Value) -> Result<(), ChannelError>;
}

/// Push a batch of updates to a session's channel, one send per update.
///
/// Updates are dropped wholesale when no channel is registered or the
/// channel reports disconnected; the client recovers state from the
/// next poll tick. A send error mid-batch is logged and the remaining
/// updates are still attempted (partial delivery).
pub(crate) async fn send_updates(
    session_id: &str,
    channel: Option<&std::sync::Arc<dyn DeliveryChannel>>,
    updates: &[ProductionUpdate],
) {
    let Some(channel) = channel else {
        tracing::debug!(
            session_id,
            count = updates.len(),
            "No channel registered, dropping updates",
        );
        return;
    };

    if !channel.is_connected() {
        tracing::debug!(
            session_id,
            count = updates.len(),
            "Channel disconnected, dropping updates",
        );
        return;
    }

    for update in updates {
        let payload = match serde_json::to_value(update) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(session_id, error = %e, "Failed to serialize update");
                continue;
            }
        };
        if let Err(e) = channel.send(EVENT_PRODUCTION_UPDATE, payload).await {
            tracing::warn!(
                session_id,
                entity_id = %update.entity_id,
                error = %e,
                "Failed to deliver update",
            );
        }
    }
}

/// Push one notification to a session's channel, best-effort.
///
/// Unlike updates, the notification is already retained in the store,
/// so a failed or skipped send only costs latency; the client can
/// fetch it explicitly after reconnecting.
pub(crate) async fn send_notification(
    session_id: &str,
    channel: Option<&std::sync::Arc<dyn DeliveryChannel>>,
    notification: &ProductionNotification,
) {
    let Some(channel) = channel else { return };
    if !channel.is_connected() {
        return;
    }

    let payload = match serde_json::to_value(notification) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(session_id, error = %e, "Failed to serialize notification");
            return;
        }
    };
    if let Err(e) = channel.send(EVENT_PRODUCTION_NOTIFICATION, payload).await {
        tracing::warn!(
            session_id,
            notification_id = %notification.id,
            error = %e,
            "Failed to deliver notification",
        );
    }
}
