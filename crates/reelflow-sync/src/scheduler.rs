//! Per-session polling loops.
//!
//! Every subscribed session gets two independently-timed repeating
//! loops, one per backing job system. Each loop awaits its own tick
//! body before sleeping again, so ticks of one category never overlap:
//! a tick slower than the interval delays the next tick instead of
//! racing it, which rules out duplicate terminal notifications for the
//! same id. Cancellation is tied to subscription teardown through a
//! stored [`CancellationToken`], so a cancelled loop never fires again.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::service::SyncService;

/// Which job system a loop polls.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PollCategory {
    Tasks,
    Workflows,
}

impl PollCategory {
    fn name(self) -> &'static str {
        match self {
            PollCategory::Tasks => "tasks",
            PollCategory::Workflows => "workflows",
        }
    }
}

/// Handles for one session's pair of polling loops.
pub(crate) struct PollingLoops {
    cancel: CancellationToken,
    task_handle: tokio::task::JoinHandle<()>,
    workflow_handle: tokio::task::JoinHandle<()>,
}

impl PollingLoops {
    /// Spawn both loops for a session.
    pub fn start(
        service: Arc<SyncService>,
        session_id: String,
        cancel: CancellationToken,
    ) -> Self {
        let task_handle = tokio::spawn(run_poll_loop(
            Arc::clone(&service),
            session_id.clone(),
            PollCategory::Tasks,
            service.config().task_poll_interval,
            cancel.clone(),
        ));
        let workflow_handle = tokio::spawn(run_poll_loop(
            Arc::clone(&service),
            session_id,
            PollCategory::Workflows,
            service.config().workflow_poll_interval,
            cancel.clone(),
        ));

        Self {
            cancel,
            task_handle,
            workflow_handle,
        }
    }

    /// Cancel both loops and wait up to 5 seconds each for a clean exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let grace = Duration::from_secs(5);
        let _ = tokio::time::timeout(grace, self.task_handle).await;
        let _ = tokio::time::timeout(grace, self.workflow_handle).await;
    }
}

/// One category's loop: sleep an interval, poll, repeat until cancelled.
async fn run_poll_loop(
    service: Arc<SyncService>,
    session_id: String,
    category: PollCategory,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // A tick that overruns its interval delays the next tick rather
    // than triggering a catch-up burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // `interval` yields immediately on first tick; consume it so the
    // first poll happens one full interval after subscribe.
    ticker.tick().await;

    tracing::debug!(
        session_id = %session_id,
        category = category.name(),
        interval_ms = interval.as_millis() as u64,
        "Polling loop started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => match category {
                PollCategory::Tasks => service.poll_tasks_tick(&session_id).await,
                PollCategory::Workflows => service.poll_workflows_tick(&session_id).await,
            },
        }
    }

    tracing::debug!(
        session_id = %session_id,
        category = category.name(),
        "Polling loop stopped",
    );
}
