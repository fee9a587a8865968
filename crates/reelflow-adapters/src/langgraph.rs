//! REST client for the graph workflow engine's status endpoint.
//!
//! Wraps the engine's HTTP status API (`GET /workflows/{id}/status`)
//! using [`reqwest`]. The engine reports lower-case states
//! (`running`, `completed`, `failed`).

use serde::Deserialize;

/// Raw status payload returned by the workflow engine for one workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowStatusPayload {
    /// Engine-native status string, already lower-case.
    pub status: String,
    /// Completion percentage (0-100), if the engine reports one.
    pub progress: Option<f64>,
    /// Name of the graph node currently executing, if known.
    pub current_step: Option<String>,
    /// Serialized graph topology; opaque to the sync layer.
    pub graph: Option<serde_json::Value>,
    /// Free-form run metadata; may carry `progress` / `current_step`
    /// for engines that only report through metadata.
    pub metadata: Option<serde_json::Value>,
    /// Final output, present once the workflow completed.
    pub result: Option<serde_json::Value>,
    /// Error description, present once the workflow failed.
    pub error: Option<String>,
}

/// Errors from the workflow-engine REST layer.
#[derive(Debug, thiserror::Error)]
pub enum LangGraphApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine returned a non-2xx status code.
    #[error("Workflow engine API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the workflow-engine status API.
pub struct LangGraphStatusApi {
    client: reqwest::Client,
    api_url: String,
}

impl LangGraphStatusApi {
    /// Create a new client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://engine-host:8123`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Fetch the current status of a workflow run.
    pub async fn get_workflow_status(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowStatusPayload, LangGraphApiError> {
        let response = self
            .client
            .get(format!("{}/workflows/{workflow_id}/status", self.api_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LangGraphApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_minimal() {
        let payload: WorkflowStatusPayload =
            serde_json::from_str(r#"{"status": "running"}"#).unwrap();
        assert_eq!(payload.status, "running");
        assert!(payload.progress.is_none());
        assert!(payload.current_step.is_none());
    }

    #[test]
    fn payload_deserializes_full() {
        let payload: WorkflowStatusPayload = serde_json::from_str(
            r#"{
                "status": "completed",
                "progress": 100,
                "current_step": "finalize",
                "graph": {"nodes": []},
                "result": {"frames": 240}
            }"#,
        )
        .unwrap();
        assert_eq!(payload.progress, Some(100.0));
        assert_eq!(payload.current_step.as_deref(), Some("finalize"));
        assert_eq!(payload.result.unwrap()["frames"], 240);
    }
}
