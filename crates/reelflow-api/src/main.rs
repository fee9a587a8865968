use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelflow_adapters::{CeleryStatusApi, LangGraphStatusApi};
use reelflow_api::config::ServerConfig;
use reelflow_api::router::build_app_router;
use reelflow_api::state::AppState;
use reelflow_api::ws;
use reelflow_core::config::SyncConfig;
use reelflow_sync::SyncService;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelflow_api=debug,reelflow_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let sync_config = SyncConfig::from_env();
    tracing::info!(
        task_poll_ms = sync_config.task_poll_interval.as_millis() as u64,
        workflow_poll_ms = sync_config.workflow_poll_interval.as_millis() as u64,
        batch_size = sync_config.batch_size,
        "Loaded sync configuration",
    );

    // --- Status adapters (shared reqwest client) ---
    let http = reqwest::Client::new();
    let celery = Arc::new(CeleryStatusApi::with_client(
        http.clone(),
        config.celery_api_url.clone(),
    ));
    let langgraph = Arc::new(LangGraphStatusApi::with_client(
        http,
        config.langgraph_api_url.clone(),
    ));

    // --- Sync service ---
    let sync = SyncService::new(sync_config, celery, langgraph);
    tracing::info!("Sync service created");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sync: Arc::clone(&sync),
        ws_manager: Arc::clone(&ws_manager),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop all polling loops and drop session state first; after this
    // no more updates are produced.
    sync.cleanup().await;
    tracing::info!("Sync service cleaned up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
