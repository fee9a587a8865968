//! WebSocket-backed implementation of the sync layer's delivery channel.

use async_trait::async_trait;
use axum::extract::ws::Message;

use reelflow_sync::{ChannelError, DeliveryChannel};

use crate::ws::manager::WsSender;

/// Delivery channel for one session's WebSocket connection.
///
/// Wraps the connection's outbound message sender. Once the socket's
/// forwarding task exits the receiver is dropped, the sender reports
/// closed, and the sync layer starts dropping this session's updates
/// until the client reconnects.
pub struct WsChannel {
    sender: WsSender,
}

impl WsChannel {
    pub fn new(sender: WsSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl DeliveryChannel for WsChannel {
    fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send(&self, event: &str, payload: serde_json::Value) -> Result<(), ChannelError> {
        let message = serde_json::json!({
            "event": event,
            "data": payload,
        });
        let text = serde_json::to_string(&message)
            .map_err(|e| ChannelError::new(format!("serialize: {e}")))?;
        self.sender
            .send(Message::Text(text.into()))
            .map_err(|e| ChannelError::new(format!("socket closed: {e}")))
    }
}
