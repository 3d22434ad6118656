//! Restart patch body
//!
//! Serializes to the same strategic-merge patch `kubectl rollout restart`
//! sends, so the orchestrator treats both identically.

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Pod template annotation written by `kubectl rollout restart`
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// `{"spec":{"template":{"metadata":{"annotations":{...}}}}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartPatch {
    pub spec: PatchSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSpec {
    pub template: PatchTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTemplate {
    pub metadata: PatchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMetadata {
    pub annotations: RestartAnnotations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartAnnotations {
    #[serde(rename = "kubectl.kubernetes.io/restartedAt")]
    pub restarted_at: String,
}

impl RestartPatch {
    /// Patch stamped with the current time
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Patch stamped with `timestamp`, RFC3339 with nanosecond precision
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            spec: PatchSpec {
                template: PatchTemplate {
                    metadata: PatchMetadata {
                        annotations: RestartAnnotations {
                            restarted_at: timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                        },
                    },
                },
            },
        }
    }

    pub fn restarted_at(&self) -> &str {
        &self.spec.template.metadata.annotations.restarted_at
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
