//! Thin status clients for the two backing job systems.
//!
//! Each adapter exposes a uniform "get status by id" operation against
//! one system: the Celery-style task queue (`celery`) and the
//! LangGraph-style workflow engine (`langgraph`). The sync layer
//! consumes them through the traits in [`source`], which is also the
//! seam tests use to inject in-memory fakes.

pub mod celery;
pub mod langgraph;
pub mod source;

pub use celery::{CeleryStatusApi, TaskStatusPayload};
pub use langgraph::{LangGraphStatusApi, WorkflowStatusPayload};
pub use source::{SourceError, TaskStatusSource, WorkflowStatusSource};
