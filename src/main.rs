//! Rollout Restarter
//!
//! Rolling restart of every Deployment, StatefulSet and DaemonSet in a
//! namespace whose name contains a substring.
//!
//! ```text
//! rollout-restarter --namespace prod --controller statefulset --match database
//! ```
//!
//! Exits 0 when every matched controller was restarted (or nothing matched),
//! 1 on any configuration, list or patch failure.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollout_restarter::rollout::DEFAULT_MATCH;
use rollout_restarter::{
    resolve, ConnectionOptions, KubeWorkloadApi, RestartCoordinator, Result, RunSettings, RunState,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Rollout Restarter - rolling restart of Kubernetes controllers by name match
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Namespace to operate in. Defaults to the current context's namespace
    #[arg(long, env = "RESTART_NAMESPACE", default_value = "")]
    namespace: String,

    /// Controller type to target: deployment, statefulset, daemonset. Defaults to all
    #[arg(long, env = "RESTART_CONTROLLER", default_value = "")]
    controller: String,

    /// Substring to match in controller names
    #[arg(long = "match", env = "RESTART_MATCH", default_value = DEFAULT_MATCH)]
    pattern: String,

    /// Kubeconfig context to use instead of the current context
    #[arg(long, env = "KUBE_CONTEXT")]
    context: Option<String>,

    /// Path to a kubeconfig file
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Restarts in flight at once within a controller type (max 10)
    #[arg(long, default_value = "1")]
    concurrency: usize,

    /// Retries for conflicts and other transient API failures
    #[arg(long, default_value = "0")]
    max_retries: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    let code = match run(args).await {
        Ok(state) => {
            print!("{}", state);
            state.exit_code()
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(code);
}

async fn run(args: Args) -> Result<RunState> {
    // Flag validation happens before any cluster access
    let settings = RunSettings::new(
        &args.controller,
        &args.pattern,
        args.concurrency,
        args.max_retries,
    )?;

    let options = ConnectionOptions {
        namespace: Some(args.namespace),
        context: args.context,
        kubeconfig: args.kubeconfig,
    };
    let connection = resolve(&options).await?;

    info!("Starting Rollout Restarter v{}", rollout_restarter::VERSION);
    info!("  Namespace: {}", connection.namespace);
    info!("  Match: {:?}", settings.pattern);
    info!("  Concurrency: {}", settings.concurrency);

    let api = Arc::new(KubeWorkloadApi::new(connection.client));
    let coordinator = RestartCoordinator::new(api, connection.namespace, settings);

    Ok(coordinator.run().await)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("kube=info".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap());

    // Logs go to stderr; stdout carries only the summary
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["rollout-restarter"]).unwrap();
        assert_eq!(args.namespace, "");
        assert_eq!(args.controller, "");
        assert_eq!(args.pattern, "database");
        assert_eq!(args.concurrency, 1);
        assert_eq!(args.max_retries, 0);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "rollout-restarter",
            "--namespace",
            "prod",
            "--controller",
            "statefulset",
            "--match",
            "cache",
        ])
        .unwrap();
        assert_eq!(args.namespace, "prod");
        assert_eq!(args.controller, "statefulset");
        assert_eq!(args.pattern, "cache");
    }

    #[tokio::test]
    async fn test_bogus_controller_fails_before_connecting() {
        let args = Args::try_parse_from([
            "rollout-restarter",
            "--controller=bogus",
            "--kubeconfig",
            "/nonexistent/kubeconfig",
        ])
        .unwrap();

        let err = run(args).await.unwrap_err();
        assert!(matches!(
            err,
            rollout_restarter::Error::InvalidControllerKind { .. }
        ));
    }
}
