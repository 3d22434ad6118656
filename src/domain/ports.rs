//! Domain Ports - Core types and the cluster boundary
//!
//! [`WorkloadApi`] is the only seam between the rollout logic and the
//! Kubernetes API. The kube adapter and the in-memory adapter implement it.

use crate::domain::patch::RestartPatch;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Controller Kind
// =============================================================================

/// Workload controller kinds that can be restarted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl ControllerKind {
    /// All kinds in the order a full run processes them
    pub const ALL: [ControllerKind; 3] = [
        ControllerKind::Deployment,
        ControllerKind::StatefulSet,
        ControllerKind::DaemonSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerKind::Deployment => "deployment",
            ControllerKind::StatefulSet => "statefulset",
            ControllerKind::DaemonSet => "daemonset",
        }
    }
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deployment" | "deployments" | "deploy" => Ok(ControllerKind::Deployment),
            "statefulset" | "statefulsets" | "sts" => Ok(ControllerKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Ok(ControllerKind::DaemonSet),
            _ => Err(Error::InvalidControllerKind {
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Controller Reference / Outcome
// =============================================================================

/// Identity of one controller instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerRef {
    pub kind: ControllerKind,
    pub name: String,
    pub namespace: String,
}

impl ControllerRef {
    pub fn new(kind: ControllerKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Summary key, `<kind>/<name>`
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

impl std::fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Result of one restart attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    pub target: ControllerRef,
    pub success: bool,
    /// Human-readable failure reason, set iff `success` is false
    pub reason: Option<String>,
    /// Number of patch requests sent
    pub attempts: u32,
}

impl RestartOutcome {
    pub fn succeeded(target: ControllerRef, attempts: u32) -> Self {
        Self {
            target,
            success: true,
            reason: None,
            attempts,
        }
    }

    pub fn failed(target: ControllerRef, reason: impl Into<String>, attempts: u32) -> Self {
        Self {
            target,
            success: false,
            reason: Some(reason.into()),
            attempts,
        }
    }
}

// =============================================================================
// Workload API Port
// =============================================================================

/// Port for the list/patch operations consumed from the cluster
#[async_trait]
pub trait WorkloadApi: Send + Sync {
    /// List every controller of `kind` in `namespace`
    async fn list(&self, kind: ControllerKind, namespace: &str) -> Result<Vec<ControllerRef>>;

    /// Send a restart patch to one controller
    async fn patch(&self, target: &ControllerRef, patch: &RestartPatch) -> Result<()>;
}

pub type WorkloadApiRef = Arc<dyn WorkloadApi>;
