//! Tuning knobs for the sync service, loaded from environment variables.

use std::time::Duration;

/// Configuration for polling cadence, batching, and notification expiry.
///
/// All fields have defaults suitable for local development; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between task-queue poll ticks (default: 3000 ms).
    pub task_poll_interval: Duration,
    /// Interval between workflow-engine poll ticks (default: 5000 ms).
    pub workflow_poll_interval: Duration,
    /// Maximum number of tracked ids polled per tick (default: 10).
    pub batch_size: usize,
    /// How long a notification without an explicit expiry stays live
    /// (default: 1 hour).
    pub notification_ttl: Duration,
    /// Reserved for outbound webhook fan-out; recognized but not yet
    /// consulted anywhere.
    pub enable_webhooks: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            task_poll_interval: Duration::from_millis(3000),
            workflow_poll_interval: Duration::from_millis(5000),
            batch_size: 10,
            notification_ttl: Duration::from_millis(3_600_000),
            enable_webhooks: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default   |
    /// |-----------------------------|-----------|
    /// | `TASK_POLL_INTERVAL_MS`     | `3000`    |
    /// | `WORKFLOW_POLL_INTERVAL_MS` | `5000`    |
    /// | `SYNC_BATCH_SIZE`           | `10`      |
    /// | `NOTIFICATION_TTL_MS`       | `3600000` |
    /// | `ENABLE_WEBHOOKS`           | `false`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            task_poll_interval: env_millis("TASK_POLL_INTERVAL_MS", defaults.task_poll_interval),
            workflow_poll_interval: env_millis(
                "WORKFLOW_POLL_INTERVAL_MS",
                defaults.workflow_poll_interval,
            ),
            batch_size: env_parse("SYNC_BATCH_SIZE", defaults.batch_size),
            notification_ttl: env_millis("NOTIFICATION_TTL_MS", defaults.notification_ttl),
            enable_webhooks: env_parse("ENABLE_WEBHOOKS", defaults.enable_webhooks),
        }
    }
}

/// Read a millisecond duration from the environment, falling back to
/// `default` when unset; panics on unparseable values so that
/// misconfiguration fails fast at startup.
fn env_millis(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Ok(raw) => Duration::from_millis(
            raw.parse()
                .unwrap_or_else(|_| panic!("{var} must be a valid millisecond count")),
        ),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{var} has an invalid value")),
        Err(_) => default,
    }
}
