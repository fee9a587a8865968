use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use reelflow_sync::{DeliveryChannel, SyncService};

use crate::state::AppState;
use crate::ws::channel::WsChannel;
use crate::ws::manager::WsManager;

/// Query parameters for `GET /ws`.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Session the connection delivers updates for.
    pub session_id: String,
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// its sender is wrapped into a [`WsChannel`] and handed to the sync
/// service as the session's delivery channel (subscribing the session
/// if it was not already).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        handle_socket(socket, query.session_id, state.ws_manager, state.sync)
    })
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Registers the session's delivery channel with the sync service.
///   3. Spawns a sender task that forwards messages from the manager channel.
///   4. Processes inbound messages on the current task.
///   5. Cleans up on disconnect.
async fn handle_socket(
    socket: WebSocket,
    session_id: String,
    ws_manager: Arc<WsManager>,
    sync: Arc<SyncService>,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, session_id = %session_id, "WebSocket connected");

    // Register and get both halves of the outbound message channel.
    let (tx, mut rx) = ws_manager.add(conn_id.clone(), session_id.clone()).await;

    // Hand the session its live delivery channel. Re-subscribing an
    // existing session only swaps the channel in.
    let channel: Arc<dyn DeliveryChannel> = Arc::new(WsChannel::new(tx));
    sync.subscribe(&session_id, None, Some(channel)).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {
                // Clients drive subscriptions over REST; inbound
                // payloads are ignored.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up the connection. The subscription stays alive: polling is
    // the source of truth and the client may reconnect. Its channel now
    // reports disconnected, so updates are dropped until then.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, session_id = %session_id, "WebSocket disconnected");
}
