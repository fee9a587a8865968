use std::sync::Arc;

use reelflow_sync::SyncService;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sync: Arc<SyncService>,
    pub ws_manager: Arc<WsManager>,
}
