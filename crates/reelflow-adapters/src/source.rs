//! Trait seams between the sync layer and the concrete status clients.
//!
//! The sync service depends on these traits instead of the HTTP types
//! so its polling logic can be exercised with in-memory fakes.

use async_trait::async_trait;

use crate::celery::{CeleryApiError, CeleryStatusApi, TaskStatusPayload};
use crate::langgraph::{LangGraphApiError, LangGraphStatusApi, WorkflowStatusPayload};

/// Opaque adapter failure. The sync layer treats any source error as
/// "no update this cycle for this id": log, skip, continue the batch.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SourceError(String);

impl SourceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<CeleryApiError> for SourceError {
    fn from(e: CeleryApiError) -> Self {
        Self(e.to_string())
    }
}

impl From<LangGraphApiError> for SourceError {
    fn from(e: LangGraphApiError) -> Self {
        Self(e.to_string())
    }
}

/// "Get status by id" against the task queue.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// `Ok(None)` means the queue does not know the task; the id is
    /// skipped this cycle without being untracked.
    async fn get_task_status(&self, task_id: &str)
        -> Result<Option<TaskStatusPayload>, SourceError>;
}

/// "Get status by id" against the workflow engine.
#[async_trait]
pub trait WorkflowStatusSource: Send + Sync {
    async fn get_workflow_status(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowStatusPayload, SourceError>;
}

#[async_trait]
impl TaskStatusSource for CeleryStatusApi {
    async fn get_task_status(
        &self,
        task_id: &str,
    ) -> Result<Option<TaskStatusPayload>, SourceError> {
        Ok(CeleryStatusApi::get_task_status(self, task_id).await?)
    }
}

#[async_trait]
impl WorkflowStatusSource for LangGraphStatusApi {
    async fn get_workflow_status(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowStatusPayload, SourceError> {
        Ok(LangGraphStatusApi::get_workflow_status(self, workflow_id).await?)
    }
}
