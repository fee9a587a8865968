//! Handlers for the `/sync` resource.
//!
//! Thin glue over [`SyncService`]: sessions subscribe and manage their
//! watch lists here, while updates flow out over the WebSocket channel
//! registered by the upgrade handler.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use reelflow_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /sync/sessions/{session_id}/subscribe`.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeBody {
    /// Project to associate with the subscription; required for the
    /// status summary.
    pub project_id: Option<String>,
}

/// Query parameters for `GET /sync/sessions/{session_id}/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, include dismissed notifications. Defaults to `false`.
    pub include_read: Option<bool>,
}

/// POST /api/v1/sync/sessions/{session_id}/subscribe
///
/// Create a subscription and start its polling loops. Idempotent:
/// re-subscribing leaves the existing subscription untouched.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<SubscribeBody>>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body.unwrap_or_default();
    state.sync.subscribe(&session_id, body.project_id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sync/sessions/{session_id}
///
/// Tear down a subscription. Safe to call for unknown sessions.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.sync.unsubscribe(&session_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sync/sessions/{session_id}/tasks/{task_id}
pub async fn track_task(
    State(state): State<AppState>,
    Path((session_id, task_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.sync.track_task(&session_id, &task_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sync/sessions/{session_id}/tasks/{task_id}
pub async fn untrack_task(
    State(state): State<AppState>,
    Path((session_id, task_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.sync.untrack_task(&session_id, &task_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sync/sessions/{session_id}/workflows/{workflow_id}
pub async fn track_workflow(
    State(state): State<AppState>,
    Path((session_id, workflow_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.sync.track_workflow(&session_id, &workflow_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sync/sessions/{session_id}/workflows/{workflow_id}
pub async fn untrack_workflow(
    State(state): State<AppState>,
    Path((session_id, workflow_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.sync.untrack_workflow(&session_id, &workflow_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sync/sessions/{session_id}/summary
///
/// Point-in-time status counts across the session's tracked entities.
/// 404 when the session is not subscribed with a project.
pub async fn status_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    match state.sync.get_status_summary(&session_id).await {
        Some(summary) => Ok(Json(serde_json::json!({ "data": summary }))),
        None => Err(AppError::Core(CoreError::SessionNotFound(session_id))),
    }
}

/// GET /api/v1/sync/sessions/{session_id}/notifications
///
/// List the session's notifications with optional dismissed entries.
/// Unknown sessions yield an empty list.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let include_read = params.include_read.unwrap_or(false);
    let notifications = state.sync.get_notifications(&session_id, include_read).await;
    Ok(Json(serde_json::json!({ "data": notifications })))
}

/// POST /api/v1/sync/sessions/{session_id}/notifications/{id}/dismiss
///
/// Mark a notification dismissed. Quiet no-op for unknown ids.
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path((session_id, notification_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state
        .sync
        .dismiss_notification(&session_id, &notification_id)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sync/sessions/{session_id}/notifications
///
/// Clear the session's notification list.
pub async fn clear_notifications(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.sync.clear_notifications(&session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
