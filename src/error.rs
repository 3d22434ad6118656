//! Error types for the rollout restarter
//!
//! Fatal errors (configuration, namespace resolution) abort the run before any
//! controller is touched. List and patch errors are recovered per kind and per
//! controller and end up in the run summary.

use kube::config::{InferConfigError, KubeconfigError};
use thiserror::Error;

use crate::domain::ControllerKind;

/// Unified error type for the restarter
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid controller type: {value} (expected deployment, statefulset or daemonset)")]
    InvalidControllerKind { value: String },

    #[error("Unable to resolve namespace: context `{context}` has no namespace set, pass --namespace")]
    NamespaceResolution { context: String },

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("Unable to infer cluster configuration: {0}")]
    InferConfig(#[from] InferConfigError),

    // =========================================================================
    // Rollout Errors
    // =========================================================================
    #[error("Error listing {kind}s: {reason}")]
    List { kind: ControllerKind, reason: String },

    #[error("Error restarting {kind} {name}: {reason}")]
    Patch {
        kind: ControllerKind,
        name: String,
        reason: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error is transient, i.e. a later attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Kube(kube::Error::Api(resp)) => {
                matches!(resp.code, 409 | 429) || resp.code >= 500
            }
            Error::Kube(kube::Error::HyperError(_)) | Error::Kube(kube::Error::Service(_)) => true,
            _ => false,
        }
    }
}

/// Result type alias for the restarter
pub type Result<T> = std::result::Result<T, Error>;
