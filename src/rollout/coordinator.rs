//! Run Coordinator
//!
//! Drives one pass of list -> filter -> restart over the requested
//! controller kinds and returns the accumulated [`RunState`].

use crate::domain::ports::{ControllerKind, WorkloadApiRef};
use crate::error::{Error, Result};
use crate::rollout::applier::{RestartApplier, RetryPolicy};
use crate::rollout::filter;
use crate::rollout::state::RunState;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

/// Default substring matched against controller names
pub const DEFAULT_MATCH: &str = "database";

/// Upper bound on in-flight restarts within one kind
pub const MAX_CONCURRENCY: usize = 10;

// =============================================================================
// Run Settings
// =============================================================================

/// What a run restarts and how
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Kinds to process, in order
    pub kinds: Vec<ControllerKind>,
    /// Substring a controller name must contain
    pub pattern: String,
    /// Restarts in flight at once within a kind
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            kinds: ControllerKind::ALL.to_vec(),
            pattern: DEFAULT_MATCH.to_string(),
            concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl RunSettings {
    /// Build settings from raw flag values
    pub fn new(controller: &str, pattern: &str, concurrency: usize, max_retries: u32) -> Result<Self> {
        let kinds = Self::kinds_from_flag(controller)?;

        if concurrency == 0 {
            return Err(Error::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        let concurrency = if concurrency > MAX_CONCURRENCY {
            warn!(
                "Concurrency {} exceeds the limit, using {}",
                concurrency, MAX_CONCURRENCY
            );
            MAX_CONCURRENCY
        } else {
            concurrency
        };

        Ok(Self {
            kinds,
            pattern: pattern.to_string(),
            concurrency,
            retry: RetryPolicy::with_max_retries(max_retries),
        })
    }

    /// Empty flag selects every kind
    pub fn kinds_from_flag(flag: &str) -> Result<Vec<ControllerKind>> {
        if flag.trim().is_empty() {
            Ok(ControllerKind::ALL.to_vec())
        } else {
            Ok(vec![flag.parse()?])
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs restarts for one namespace
pub struct RestartCoordinator {
    api: WorkloadApiRef,
    applier: RestartApplier,
    namespace: String,
    settings: RunSettings,
}

impl RestartCoordinator {
    pub fn new(api: WorkloadApiRef, namespace: impl Into<String>, settings: RunSettings) -> Self {
        let applier = RestartApplier::new(api.clone(), settings.retry.clone());
        Self {
            api,
            applier,
            namespace: namespace.into(),
            settings,
        }
    }

    /// Process every requested kind and return the outcomes
    pub async fn run(&self) -> RunState {
        info!(
            namespace = %self.namespace,
            pattern = %self.settings.pattern,
            kinds = ?self.settings.kinds,
            "Starting rolling restart"
        );

        let mut state = RunState::new();
        for kind in &self.settings.kinds {
            self.process_kind(*kind, &mut state).await;
        }

        info!(
            succeeded = state.succeeded().len(),
            failed = state.failed().len(),
            "Rolling restart finished"
        );
        state
    }

    async fn process_kind(&self, kind: ControllerKind, state: &mut RunState) {
        let controllers = match self.api.list(kind, &self.namespace).await {
            Ok(controllers) => controllers,
            Err(e) => {
                let err = Error::List {
                    kind,
                    reason: e.to_string(),
                };
                error!(kind = %kind, namespace = %self.namespace, "{}", err);
                state.record_list_failure(&err);
                return;
            }
        };

        let listed = controllers.len();
        let matched = filter::filter(controllers, &self.settings.pattern);
        debug!(kind = %kind, listed, matched = matched.len(), "Filtered controllers");

        // `buffered` yields in discovery order, so the summary order does not
        // depend on concurrency
        let mut outcomes = stream::iter(matched.iter())
            .map(|target| self.applier.apply(target))
            .buffered(self.settings.concurrency);

        while let Some(outcome) = outcomes.next().await {
            state.record(outcome);
        }
    }
}
