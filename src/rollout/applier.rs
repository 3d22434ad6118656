//! Restart Applier
//!
//! Sends one restart patch per controller and turns every failure into a
//! [`RestartOutcome`]. Transient failures are retried only when a retry
//! budget is configured.

use crate::domain::ports::{ControllerRef, RestartOutcome, WorkloadApiRef};
use crate::domain::RestartPatch;
use crate::error::Error;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

// =============================================================================
// Retry Policy
// =============================================================================

/// Retry budget for transient patch failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt, 0 = single attempt
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Give up once this much time has passed, whatever the retry count
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(5),
            max_elapsed: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }
}

// =============================================================================
// Applier
// =============================================================================

/// Applies restart patches through a [`crate::domain::WorkloadApi`]
#[derive(Clone)]
pub struct RestartApplier {
    api: WorkloadApiRef,
    retry: RetryPolicy,
    /// Last stamp handed out; stamps are strictly increasing
    last_stamp: Arc<Mutex<DateTime<Utc>>>,
}

impl RestartApplier {
    pub fn new(api: WorkloadApiRef, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            last_stamp: Arc::new(Mutex::new(DateTime::<Utc>::MIN_UTC)),
        }
    }

    /// Current time, bumped by 1ns if the clock has not moved since the last call
    fn next_stamp(&self) -> DateTime<Utc> {
        let mut last = self.last_stamp.lock();
        let now = Utc::now();
        let stamp = if now > *last {
            now
        } else {
            *last + chrono::Duration::nanoseconds(1)
        };
        *last = stamp;
        stamp
    }

    /// Restart one controller. Never fails; errors are folded into the outcome.
    pub async fn apply(&self, target: &ControllerRef) -> RestartOutcome {
        info!(kind = %target.kind, name = %target.name, "Restarting {}: {}", target.kind, target.name);

        let max_retries = self.retry.max_retries;
        let mut attempts = 0u32;

        let result = backoff::future::retry(self.retry.backoff(), || {
            attempts += 1;
            let attempt = attempts;
            async move {
                // Fresh timestamp on every attempt
                let patch = RestartPatch::at(self.next_stamp());
                self.api.patch(target, &patch).await.map_err(|e| {
                    if attempt <= max_retries && e.is_transient() {
                        warn!(
                            kind = %target.kind,
                            name = %target.name,
                            attempt,
                            "Transient failure restarting {}, retrying: {}",
                            target,
                            e
                        );
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await;

        match result {
            Ok(()) => RestartOutcome::succeeded(target.clone(), attempts),
            Err(e) => {
                let reason = e.to_string();
                let err = Error::Patch {
                    kind: target.kind,
                    name: target.name.clone(),
                    reason: reason.clone(),
                };
                error!(kind = %target.kind, name = %target.name, attempts, "{}", err);
                RestartOutcome::failed(target.clone(), reason, attempts)
            }
        }
    }
}
