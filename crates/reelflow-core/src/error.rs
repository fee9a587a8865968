use crate::types::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No subscription exists for session {0}")]
    SessionNotFound(SessionId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
