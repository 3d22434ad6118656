//! Connection Resolver
//!
//! Resolves the effective namespace and an authenticated [`kube::Client`]
//! from an explicit override, a kubeconfig context, or the in-cluster
//! service account.

use crate::error::{Error, Result};
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

// =============================================================================
// Options
// =============================================================================

/// Inputs to connection resolution
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// Namespace override, empty or `None` means resolve from the context
    pub namespace: Option<String>,
    /// Kubeconfig context, `None` means the current context
    pub context: Option<String>,
    /// Explicit kubeconfig path instead of `KUBECONFIG` / `~/.kube/config`
    pub kubeconfig: Option<PathBuf>,
}

impl ConnectionOptions {
    fn namespace_override(&self) -> Option<&str> {
        self.namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }
}

/// Resolved namespace plus client
pub struct Connection {
    pub namespace: String,
    pub client: Client,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve the target namespace and build a client
pub async fn resolve(options: &ConnectionOptions) -> Result<Connection> {
    let (config, namespace) = match load_kubeconfig(options)? {
        Some(kubeconfig) => {
            let namespace = match options.namespace_override() {
                Some(ns) => ns.to_string(),
                None => context_namespace(&kubeconfig, options.context.as_deref())?,
            };
            let kube_options = KubeConfigOptions {
                context: options.context.clone(),
                ..Default::default()
            };
            let config = Config::from_custom_kubeconfig(kubeconfig, &kube_options).await?;
            (config, namespace)
        }
        None => {
            if let Some(context) = &options.context {
                return Err(Error::Configuration(format!(
                    "Context `{}` requested but no kubeconfig was found",
                    context
                )));
            }
            let config = Config::infer().await?;
            let namespace = options
                .namespace_override()
                .map(str::to_string)
                .unwrap_or_else(|| config.default_namespace.clone());
            (config, namespace)
        }
    };

    if namespace.is_empty() {
        return Err(Error::NamespaceResolution {
            context: "in-cluster".to_string(),
        });
    }

    let cluster_url = config.cluster_url.clone();
    let client = Client::try_from(config).map_err(|e| {
        Error::Configuration(format!("Unable to create Kubernetes client: {}", e))
    })?;

    info!(namespace = %namespace, cluster = %cluster_url, "Resolved cluster connection");

    Ok(Connection { namespace, client })
}

fn load_kubeconfig(options: &ConnectionOptions) -> Result<Option<Kubeconfig>> {
    if let Some(path) = &options.kubeconfig {
        debug!("Reading kubeconfig from {}", path.display());
        return Ok(Some(Kubeconfig::read_from(path)?));
    }

    present_or_absent(Kubeconfig::read())
}

/// A missing kubeconfig means "try in-cluster"; any other read error is real
fn present_or_absent(
    read: std::result::Result<Kubeconfig, KubeconfigError>,
) -> Result<Option<Kubeconfig>> {
    match read {
        Ok(kubeconfig) => Ok(Some(kubeconfig)),
        Err(KubeconfigError::FindPath) => {
            debug!("No kubeconfig path, trying in-cluster configuration");
            Ok(None)
        }
        Err(KubeconfigError::ReadConfig(ref e, ref path)) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No kubeconfig at {}, trying in-cluster configuration", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Namespace of the selected (or current) kubeconfig context
pub fn context_namespace(kubeconfig: &Kubeconfig, context: Option<&str>) -> Result<String> {
    let context_name = context
        .map(String::from)
        .or_else(|| kubeconfig.current_context.clone())
        .ok_or_else(|| {
            Error::Configuration(
                "No context specified and no current-context in kubeconfig".to_string(),
            )
        })?;

    let named = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context_name)
        .ok_or_else(|| {
            Error::Configuration(format!("Context `{}` not found in kubeconfig", context_name))
        })?;

    named
        .context
        .as_ref()
        .and_then(|c| c.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .ok_or(Error::NamespaceResolution {
            context: context_name,
        })
}
