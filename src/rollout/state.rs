//! Run state and summary report

use crate::domain::ports::{ControllerKind, ControllerRef, RestartOutcome};
use crate::error::Error;
use std::collections::BTreeMap;
use std::fmt;

/// Outcomes accumulated over one run
///
/// Every attempted controller lands in exactly one of `succeeded` or
/// `failed`.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    succeeded: Vec<ControllerRef>,
    /// `kind/name` -> failure reason
    failed: BTreeMap<String, String>,
    list_failures: BTreeMap<ControllerKind, String>,
    had_errors: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one restart outcome into the state
    pub fn record(&mut self, outcome: RestartOutcome) {
        if outcome.success {
            self.succeeded.push(outcome.target);
        } else {
            let reason = outcome
                .reason
                .unwrap_or_else(|| "unknown error".to_string());
            self.failed.insert(outcome.target.key(), reason);
            self.had_errors = true;
        }
    }

    /// Record that listing a kind failed
    pub fn record_list_failure(&mut self, err: &Error) {
        if let Error::List { kind, reason } = err {
            self.list_failures.insert(*kind, reason.clone());
        }
        self.had_errors = true;
    }

    pub fn succeeded(&self) -> &[ControllerRef] {
        &self.succeeded
    }

    pub fn failed(&self) -> &BTreeMap<String, String> {
        &self.failed
    }

    pub fn list_failures(&self) -> &BTreeMap<ControllerKind, String> {
        &self.list_failures
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Process exit status for this run
    pub fn exit_code(&self) -> i32 {
        if self.had_errors {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "--- Restart Summary ---")?;
        writeln!(f, "Successful restarts: {}", self.succeeded.len())?;
        for target in &self.succeeded {
            writeln!(f, "✓ {}", target)?;
        }

        if !self.failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed restarts: {}", self.failed.len())?;
            for (key, reason) in &self.failed {
                writeln!(f, "✗ {} - {}", key, reason)?;
            }
        }

        if !self.list_failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed listings: {}", self.list_failures.len())?;
            for (kind, reason) in &self.list_failures {
                writeln!(f, "✗ {}s - {}", kind, reason)?;
            }
        }

        Ok(())
    }
}
