//! Tool executors
//!
//! One async function per tool. Executors receive typed arguments and the live
//! collaborators they need; session checks already happened in the dispatcher.
//! Each returns the tool's `data` payload as JSON.

pub mod cluster;
pub mod connection;
pub mod helm;
pub mod resources;

pub use cluster::{cluster_info, list_namespaces, resource_usage};
pub use connection::connect;
pub use helm::{get_release, list_releases, release_history, release_status};
pub use resources::{describe_pod, list_deployments, list_pods, list_services, pod_logs};

use crate::tools::dispatcher::DispatchError;

/// Prefix a collaborator failure with the operation that failed
pub(crate) fn failed(operation: &str, err: impl std::fmt::Display) -> DispatchError {
    DispatchError::ExecutionFailed(format!("Failed to {operation}: {err}"))
}
