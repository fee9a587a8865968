//! Production synchronization and workflow coordination layer.
//!
//! Subscribes sessions to the two background job systems, polls them on
//! independent schedules, normalizes their status vocabularies into a
//! single update model, untracks entities the moment they turn
//! terminal, synthesizes TTL-bounded notifications, and fans updates
//! out over each session's live delivery channel.
//!
//! Delivery is deliberately best-effort: a session without a connected
//! channel simply drops that tick's updates. State is always
//! re-derivable from the next poll, so there is no outbound queue;
//! notifications alone are retained for explicit retrieval after a
//! reconnect.

pub mod channel;
pub mod normalize;
pub mod service;
pub mod store;
pub mod summary;

mod scheduler;

pub use channel::{ChannelError, DeliveryChannel};
pub use service::SyncService;
pub use summary::{StatusSummary, TaskStatusCounts, WorkflowStatusCounts};
