//! Polling for termination outcomes.
//!
//! A replace or terminate request is accepted long before the host is
//! actually removed. [`wait_for`] re-checks a host's status with exponential
//! backoff until the wanted condition is confirmed or a deadline passes.
//! Unknown readings count as "not yet" and are retried.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{LifecycleError, Result};
use crate::lifecycle::{Confirmation, HostLifecycle};

/// Backoff schedule for [`wait_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before the second check.
    pub initial_interval: Duration,
    /// Upper bound on the delay between checks.
    pub max_interval: Duration,
    /// Multiplier applied to the delay after each check.
    pub backoff_factor: u32,
    /// Total time allowed, measured from the first check.
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(60),
            backoff_factor: 2,
            deadline: Duration::from_secs(30 * 60),
        }
    }
}

impl PollPolicy {
    /// The delay that follows `current`, capped at `max_interval`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_factor.max(1))
            .min(self.max_interval)
    }
}

/// The condition [`wait_for`] waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The host is pending termination or already gone.
    PendingTermination,
    /// The host is gone.
    Terminated,
}

impl Condition {
    const fn label(self) -> &'static str {
        match self {
            Self::PendingTermination => "pending termination",
            Self::Terminated => "terminated",
        }
    }
}

/// How a [`wait_for`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The condition was confirmed.
    Confirmed {
        /// Number of status checks performed, including the confirming one.
        attempts: u32,
    },
    /// The deadline passed first.
    TimedOut {
        /// Number of status checks performed.
        attempts: u32,
        /// The failure behind the last check, if the service could not be read.
        last_unknown: Option<LifecycleError>,
    },
}

impl WatchOutcome {
    /// Whether the condition was confirmed.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Polls `host_name` until `condition` is confirmed or the deadline passes.
///
/// The first check runs immediately. Sleeps never overshoot the deadline, and
/// one final check runs when it is reached.
///
/// # Errors
///
/// Returns the configuration error of the first check if no token is
/// available or `host_name` is empty; nothing is retried in that case.
pub async fn wait_for(
    client: &dyn HostLifecycle,
    condition: Condition,
    host_name: &str,
    token: Option<&str>,
    policy: &PollPolicy,
) -> Result<WatchOutcome> {
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let reading = check(client, condition, host_name, token).await?;
        let last_unknown = match reading {
            Confirmation::Confirmed(true) => {
                info!(
                    host_name,
                    condition = condition.label(),
                    attempts,
                    "host condition confirmed"
                );
                return Ok(WatchOutcome::Confirmed { attempts });
            }
            Confirmation::Confirmed(false) => None,
            Confirmation::Unknown(failure) => {
                debug!(host_name, error = %failure, "host status unknown, will retry");
                Some(failure)
            }
        };

        let remaining = policy.deadline.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            warn!(
                host_name,
                condition = condition.label(),
                attempts,
                "gave up waiting for host condition"
            );
            return Ok(WatchOutcome::TimedOut {
                attempts,
                last_unknown,
            });
        }

        tokio::time::sleep(interval.min(remaining)).await;
        interval = policy.next_interval(interval);
    }
}

async fn check(
    client: &dyn HostLifecycle,
    condition: Condition,
    host_name: &str,
    token: Option<&str>,
) -> Result<Confirmation> {
    let host_name = host_name.to_owned();
    let token = token.map(str::to_owned);
    match condition {
        Condition::PendingTermination => client.pending_termination(host_name, token).await,
        Condition::Terminated => client.termination(host_name, token).await,
    }
}
