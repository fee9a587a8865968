//! Unit tests for `WsManager` and `WsChannel`.
//!
//! These tests exercise the WebSocket connection manager directly,
//! without performing any HTTP upgrades. They verify add/remove
//! semantics, the delivery-channel contract, and graceful shutdown
//! behaviour.

use assert_matches::assert_matches;
use axum::extract::ws::Message;

use reelflow_api::ws::{WsChannel, WsManager};
use reelflow_sync::DeliveryChannel;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() increments the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_increments_connection_count() {
    let manager = WsManager::new();

    let (_tx, _rx) = manager.add("conn-1".to_string(), "s1".to_string()).await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: remove() decrements the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_decrements_connection_count() {
    let manager = WsManager::new();

    let (_tx, _rx) = manager.add("conn-1".to_string(), "s1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let (_tx, _rx) = manager.add("conn-1".to_string(), "s1".to_string()).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: get_by_session() finds a session's connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_session_filters_connections() {
    let manager = WsManager::new();

    let (_tx1, _rx1) = manager.add("conn-1".to_string(), "s1".to_string()).await;
    let (_tx2, _rx2) = manager.add("conn-2".to_string(), "s2".to_string()).await;

    let conns = manager.get_by_session("s1").await;
    assert_eq!(conns, vec!["conn-1".to_string()]);
    assert!(manager.get_by_session("s3").await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let (_tx1, mut rx1) = manager.add("conn-1".to_string(), "s1".to_string()).await;
    let (_tx2, mut rx2) = manager.add("conn-2".to_string(), "s2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    // Connection count should be zero after shutdown.
    assert_eq!(manager.connection_count().await, 0);

    // Both receivers should have received a Close message.
    assert_matches!(rx1.recv().await, Some(Message::Close(_)));
    assert_matches!(rx2.recv().await, Some(Message::Close(_)));
}

// ---------------------------------------------------------------------------
// Test: WsChannel delivers named events as JSON text frames
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ws_channel_sends_event_envelope() {
    let manager = WsManager::new();
    let (tx, mut rx) = manager.add("conn-1".to_string(), "s1".to_string()).await;

    let channel = WsChannel::new(tx);
    assert!(channel.is_connected());

    channel
        .send("production_update", serde_json::json!({"entity_id": "tk-1"}))
        .await
        .unwrap();

    let Some(Message::Text(text)) = rx.recv().await else {
        panic!("expected a text frame");
    };
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["event"], "production_update");
    assert_eq!(value["data"]["entity_id"], "tk-1");
}

// ---------------------------------------------------------------------------
// Test: WsChannel reports disconnected once the receiver is gone
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ws_channel_disconnects_when_receiver_dropped() {
    let manager = WsManager::new();
    let (tx, rx) = manager.add("conn-1".to_string(), "s1".to_string()).await;
    // The manager still holds a sender clone; drop it too so the
    // channel's sender is the only one left.
    manager.remove("conn-1").await;

    let channel = WsChannel::new(tx);
    drop(rx);

    assert!(!channel.is_connected());
    assert!(channel
        .send("production_update", serde_json::json!({}))
        .await
        .is_err());
}
