//! HTTP/WebSocket surface for the reelflow sync service.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;
