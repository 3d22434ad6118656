//! Rollout Restarter
//!
//! Triggers rolling restarts of Kubernetes Deployments, StatefulSets and
//! DaemonSets whose names contain a substring, the same way
//! `kubectl rollout restart` does.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Run Coordinator                         │
//! │        for each kind: list -> filter -> restart              │
//! ├──────────────────┬──────────────────┬────────────────────────┤
//! │   Name Filter    │ Restart Applier  │       RunState         │
//! │   (substring)    │ (strategic merge │  (succeeded / failed)  │
//! │                  │  patch + retry)  │                        │
//! ├──────────────────┴──────────────────┴────────────────────────┤
//! │                     WorkloadApi port                         │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │           KubeWorkloadApi (apps/v1 via kube)           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! ├──────────────────────────────────────────────────────────────┤
//! │        Connection Resolver (kubeconfig / in-cluster)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cluster`]: Connection resolution and the kube `WorkloadApi` adapter
//! - [`domain`]: Controller types, restart patch and the `WorkloadApi` port
//! - [`rollout`]: Filtering, restart application and run coordination
//! - [`error`]: Error types and handling

pub mod cluster;
pub mod domain;
pub mod error;
pub mod rollout;

// Re-export commonly used types
pub use cluster::{resolve, Connection, ConnectionOptions, KubeWorkloadApi, Workload};

pub use domain::{
    ControllerKind, ControllerRef, RestartOutcome, RestartPatch, WorkloadApi, WorkloadApiRef,
    RESTARTED_AT_ANNOTATION,
};

pub use error::{Error, Result};

pub use rollout::{RestartApplier, RestartCoordinator, RetryPolicy, RunSettings, RunState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
