//! WebSocket infrastructure for real-time fan-out.
//!
//! Provides connection management, the per-session delivery channel
//! handed to the sync service, heartbeat pings, and the HTTP upgrade
//! handler used by Axum routes.

mod channel;
mod handler;
mod heartbeat;
pub mod manager;

pub use channel::WsChannel;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
