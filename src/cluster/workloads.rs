//! Kubernetes Workload Adapter
//!
//! Implements [`WorkloadApi`] against the apps/v1 API. Each controller kind
//! is a [`Workload`]; listing and patching are written once and dispatched
//! on [`ControllerKind`].

use crate::domain::ports::{ControllerKind, ControllerRef, WorkloadApi};
use crate::domain::RestartPatch;
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Field manager recorded on patched controllers
pub const FIELD_MANAGER: &str = "rollout-restarter";

/// Page size for list requests
const PAGE_SIZE: u32 = 500;

// =============================================================================
// Workload Kinds
// =============================================================================

/// A namespaced apps/v1 controller with a pod template
pub trait Workload:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + DeserializeOwned
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
    const KIND: ControllerKind;
}

impl Workload for Deployment {
    const KIND: ControllerKind = ControllerKind::Deployment;
}

impl Workload for StatefulSet {
    const KIND: ControllerKind = ControllerKind::StatefulSet;
}

impl Workload for DaemonSet {
    const KIND: ControllerKind = ControllerKind::DaemonSet;
}

// =============================================================================
// Kube Adapter
// =============================================================================

/// [`WorkloadApi`] backed by a live cluster
#[derive(Clone)]
pub struct KubeWorkloadApi {
    client: Client,
}

impl KubeWorkloadApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List all objects of one kind, following continue tokens
    async fn list_kind<K: Workload>(&self, namespace: &str) -> Result<Vec<ControllerRef>> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let mut refs = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            let mut params = ListParams::default().limit(PAGE_SIZE);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list = api.list(&params).await?;
            page_count += 1;
            refs.extend(
                list.items
                    .iter()
                    .map(|obj| ControllerRef::new(K::KIND, obj.name_any(), namespace)),
            );

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    trace!(kind = %K::KIND, page = page_count, total_so_far = refs.len(), "Fetched page, continuing");
                    continue_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(
            kind = %K::KIND,
            namespace = %namespace,
            pages = page_count,
            total_items = refs.len(),
            "Listed controllers"
        );

        Ok(refs)
    }

    async fn patch_kind<K: Workload>(&self, target: &ControllerRef, patch: &RestartPatch) -> Result<()> {
        let api: Api<K> = Api::namespaced(self.client.clone(), &target.namespace);
        trace!(controller = %target, body = %patch.to_json()?, "Sending restart patch");

        api.patch(
            &target.name,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Strategic(patch),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl WorkloadApi for KubeWorkloadApi {
    async fn list(&self, kind: ControllerKind, namespace: &str) -> Result<Vec<ControllerRef>> {
        match kind {
            ControllerKind::Deployment => self.list_kind::<Deployment>(namespace).await,
            ControllerKind::StatefulSet => self.list_kind::<StatefulSet>(namespace).await,
            ControllerKind::DaemonSet => self.list_kind::<DaemonSet>(namespace).await,
        }
    }

    async fn patch(&self, target: &ControllerRef, patch: &RestartPatch) -> Result<()> {
        match target.kind {
            ControllerKind::Deployment => self.patch_kind::<Deployment>(target, patch).await,
            ControllerKind::StatefulSet => self.patch_kind::<StatefulSet>(target, patch).await,
            ControllerKind::DaemonSet => self.patch_kind::<DaemonSet>(target, patch).await,
        }
    }
}
