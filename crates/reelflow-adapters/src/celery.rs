//! REST client for the task-queue status endpoint.
//!
//! Wraps the queue's HTTP status API (`GET /tasks/{id}/status`) using
//! [`reqwest`]. The queue reports Celery-style upper-case states;
//! normalization happens downstream in the sync layer.

use serde::Deserialize;

/// Raw status payload returned by the task queue for one task.
///
/// Optional fields are genuinely optional on the wire; their absence is
/// meaningful (e.g. "progress unknown") and must not be defaulted.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusPayload {
    /// Queue-native status string, e.g. `PENDING`, `STARTED`, `SUCCESS`.
    pub status: String,
    /// Completion percentage (0-100), if the task reports one.
    pub progress: Option<f64>,
    /// Human-readable progress text, if the task reports one.
    pub progress_message: Option<String>,
    /// Free-form task metadata; may itself carry `progress` /
    /// `progress_message` for tasks that only report through metadata.
    pub metadata: Option<serde_json::Value>,
    /// Task result, present once the task succeeded.
    pub result: Option<serde_json::Value>,
    /// Error description, present once the task failed.
    pub error: Option<String>,
}

/// Errors from the task-queue REST layer.
#[derive(Debug, thiserror::Error)]
pub enum CeleryApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The queue returned a non-2xx status code.
    #[error("Task queue API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the task-queue status API.
pub struct CeleryStatusApi {
    client: reqwest::Client,
    api_url: String,
}

impl CeleryStatusApi {
    /// Create a new client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://queue-host:8000`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across adapters).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Fetch the current status of a task.
    ///
    /// Returns `Ok(None)` when the queue does not know the task (404),
    /// which the sync layer treats as "no update this cycle".
    pub async fn get_task_status(
        &self,
        task_id: &str,
    ) -> Result<Option<TaskStatusPayload>, CeleryApiError> {
        let response = self
            .client
            .get(format!("{}/tasks/{task_id}/status", self.api_url))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CeleryApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_with_all_optionals_absent() {
        let payload: TaskStatusPayload = serde_json::from_str(r#"{"status": "PENDING"}"#).unwrap();
        assert_eq!(payload.status, "PENDING");
        assert!(payload.progress.is_none());
        assert!(payload.progress_message.is_none());
        assert!(payload.metadata.is_none());
        assert!(payload.result.is_none());
        assert!(payload.error.is_none());
    }

    #[test]
    fn payload_deserializes_with_metadata_progress() {
        let payload: TaskStatusPayload = serde_json::from_str(
            r#"{"status": "STARTED", "metadata": {"progress": 40, "progress_message": "rendering"}}"#,
        )
        .unwrap();
        let metadata = payload.metadata.unwrap();
        assert_eq!(metadata["progress"], 40);
        assert_eq!(metadata["progress_message"], "rendering");
    }
}
