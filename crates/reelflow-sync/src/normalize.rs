//! Collapses the two source status vocabularies into [`ProductionUpdate`].
//!
//! The task queue reports upper-case states plus flat or
//! metadata-nested progress fields; the workflow engine reports
//! lower-case states and a current step. Absence of progress stays
//! absent -- "progress unknown" is distinct from "0% done".

use reelflow_adapters::celery::TaskStatusPayload;
use reelflow_adapters::langgraph::WorkflowStatusPayload;
use reelflow_core::status::{SOURCE_CELERY, SOURCE_LANGGRAPH};
use reelflow_core::update::{EntityKind, ProductionUpdate};

/// Normalize a raw task-queue payload.
pub fn task_update(task_id: &str, payload: &TaskStatusPayload) -> ProductionUpdate {
    let progress = payload
        .progress
        .or_else(|| metadata_f64(payload.metadata.as_ref(), "progress"));

    // Fallback chain: explicit field, then metadata, then (for failed
    // tasks) the error description.
    let message = payload
        .progress_message
        .clone()
        .or_else(|| metadata_str(payload.metadata.as_ref(), "progress_message"))
        .or_else(|| payload.error.clone());

    let data = payload
        .result
        .clone()
        .or_else(|| payload.metadata.clone())
        .unwrap_or(serde_json::Value::Null);

    ProductionUpdate::new(
        SOURCE_CELERY,
        task_id,
        EntityKind::Task,
        payload.status.to_lowercase(),
    )
    .with_progress(progress)
    .with_message(message)
    .with_data(data)
}

/// Normalize a raw workflow-engine payload.
pub fn workflow_update(workflow_id: &str, payload: &WorkflowStatusPayload) -> ProductionUpdate {
    let progress = payload
        .progress
        .or_else(|| metadata_f64(payload.metadata.as_ref(), "progress"));

    let message = payload
        .current_step
        .clone()
        .or_else(|| metadata_str(payload.metadata.as_ref(), "current_step"))
        .or_else(|| payload.error.clone());

    let data = payload
        .result
        .clone()
        .or_else(|| payload.metadata.clone())
        .unwrap_or(serde_json::Value::Null);

    ProductionUpdate::new(
        SOURCE_LANGGRAPH,
        workflow_id,
        EntityKind::Workflow,
        payload.status.to_lowercase(),
    )
    .with_progress(progress)
    .with_message(message)
    .with_data(data)
}

fn metadata_f64(metadata: Option<&serde_json::Value>, key: &str) -> Option<f64> {
    metadata.and_then(|m| m.get(key)).and_then(|v| v.as_f64())
}

fn metadata_str(metadata: Option<&serde_json::Value>, key: &str) -> Option<String> {
    metadata
        .and_then(|m| m.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
