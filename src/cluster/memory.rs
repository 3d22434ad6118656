//! In-memory Workload Adapter for tests
//!
//! A [`WorkloadApi`] that keeps controllers in process memory and records
//! every patch it receives. List and patch failures can be injected with the
//! same status codes the API server would return.

use crate::domain::ports::{ControllerKind, ControllerRef, WorkloadApi};
use crate::domain::RestartPatch;
use crate::error::{Error, Result};
use async_trait::async_trait;
use kube::error::ErrorResponse;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Canned API server failure
#[derive(Debug, Clone)]
struct InjectedFailure {
    code: u16,
    reason: String,
    message: String,
    /// Remaining failures before requests succeed again, `None` = always
    remaining: Option<u32>,
}

impl InjectedFailure {
    fn to_error(&self) -> Error {
        api_error(self.code, &self.reason, &self.message)
    }
}

#[derive(Default)]
struct State {
    controllers: Vec<ControllerRef>,
    list_failures: BTreeMap<ControllerKind, InjectedFailure>,
    patch_failures: HashMap<String, InjectedFailure>,
    patches: Vec<(ControllerRef, RestartPatch)>,
    list_calls: usize,
}

/// In-memory implementation of [`WorkloadApi`]
#[derive(Default)]
pub struct InMemoryWorkloadApi {
    state: Mutex<State>,
}

impl InMemoryWorkloadApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add controllers of one kind, in listing order
    pub fn with_controllers(self, kind: ControllerKind, namespace: &str, names: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            state.controllers.extend(
                names
                    .iter()
                    .map(|name| ControllerRef::new(kind, *name, namespace)),
            );
        }
        self
    }

    /// Make every list of `kind` fail
    pub fn fail_list(&self, kind: ControllerKind, code: u16, reason: &str, message: &str) {
        self.state.lock().list_failures.insert(
            kind,
            InjectedFailure {
                code,
                reason: reason.to_string(),
                message: message.to_string(),
                remaining: None,
            },
        );
    }

    /// Make patches of `kind/name` fail, `times = None` fails forever
    pub fn fail_patch(
        &self,
        kind: ControllerKind,
        name: &str,
        code: u16,
        reason: &str,
        message: &str,
        times: Option<u32>,
    ) {
        self.state.lock().patch_failures.insert(
            format!("{}/{}", kind, name),
            InjectedFailure {
                code,
                reason: reason.to_string(),
                message: message.to_string(),
                remaining: times,
            },
        );
    }

    /// Successfully applied patches, in arrival order
    pub fn patches(&self) -> Vec<(ControllerRef, RestartPatch)> {
        self.state.lock().patches.clone()
    }

    /// Keys of successfully patched controllers, in arrival order
    pub fn patched_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .patches
            .iter()
            .map(|(target, _)| target.key())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }
}

#[async_trait]
impl WorkloadApi for InMemoryWorkloadApi {
    async fn list(&self, kind: ControllerKind, namespace: &str) -> Result<Vec<ControllerRef>> {
        let mut state = self.state.lock();
        state.list_calls += 1;

        if let Some(failure) = state.list_failures.get(&kind) {
            return Err(failure.to_error());
        }

        Ok(state
            .controllers
            .iter()
            .filter(|c| c.kind == kind && c.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn patch(&self, target: &ControllerRef, patch: &RestartPatch) -> Result<()> {
        let mut state = self.state.lock();

        if let Some(failure) = state.patch_failures.get_mut(&target.key()) {
            match failure.remaining {
                None => return Err(failure.to_error()),
                Some(n) if n > 0 => {
                    failure.remaining = Some(n - 1);
                    return Err(failure.to_error());
                }
                Some(_) => {}
            }
        }

        if !state.controllers.contains(target) {
            return Err(api_error(
                404,
                "NotFound",
                &format!("{}s.apps \"{}\" not found", target.kind, target.name),
            ));
        }

        state.patches.push((target.clone(), patch.clone()));
        Ok(())
    }
}

pub fn api_error(code: u16, reason: &str, message: &str) -> Error {
    Error::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_list_by_kind_and_namespace() {
        let api = InMemoryWorkloadApi::new()
            .with_controllers(ControllerKind::Deployment, "prod", &["database-primary", "web-api"])
            .with_controllers(ControllerKind::Deployment, "staging", &["database-primary"])
            .with_controllers(ControllerKind::StatefulSet, "prod", &["database-primary"]);

        let listed = api.list(ControllerKind::Deployment, "prod").await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["database-primary", "web-api"]);

        assert!(api.list(ControllerKind::DaemonSet, "prod").await.unwrap().is_empty());
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_list_failure() {
        let api = InMemoryWorkloadApi::new();
        api.fail_list(ControllerKind::StatefulSet, 403, "Forbidden", "cannot list statefulsets");

        let err = api.list(ControllerKind::StatefulSet, "prod").await.unwrap_err();
        assert_matches!(err, Error::Kube(kube::Error::Api(ref resp)) if resp.code == 403);
    }

    #[tokio::test]
    async fn test_patch_unknown_controller() {
        let api = InMemoryWorkloadApi::new();
        let target = ControllerRef::new(ControllerKind::Deployment, "ghost", "prod");

        let err = api.patch(&target, &RestartPatch::now()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(api.patches().is_empty());
    }

    #[tokio::test]
    async fn test_patch_failure_recovers_after_count() {
        let api = InMemoryWorkloadApi::new().with_controllers(
            ControllerKind::Deployment,
            "prod",
            &["database-cache"],
        );
        api.fail_patch(
            ControllerKind::Deployment,
            "database-cache",
            409,
            "Conflict",
            "the object has been modified",
            Some(1),
        );
        let target = ControllerRef::new(ControllerKind::Deployment, "database-cache", "prod");

        assert!(api.patch(&target, &RestartPatch::now()).await.is_err());
        assert!(api.patch(&target, &RestartPatch::now()).await.is_ok());
        assert_eq!(api.patched_keys(), vec!["deployment/database-cache"]);
    }
}
