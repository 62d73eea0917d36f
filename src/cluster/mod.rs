//! # Cluster API
//!
//! Read-only access to a Kubernetes cluster. Tools depend on the [`ClusterApi`]
//! trait; [`KubeRestClient`] implements it over the Kubernetes REST API.

pub mod error;
pub mod rest;
pub mod types;

use async_trait::async_trait;

pub use error::ClusterError;
pub use rest::{KubeClientConfig, KubeRestClient};
pub use types::{Deployment, Namespace, Node, Pod, PodLogRequest, Service};

/// Read operations the inspection tools need. No retries or caching.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError>;

    /// Pods in `namespace`, or in every namespace when `None`
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError>;

    async fn read_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError>;

    async fn read_pod_log(&self, request: &PodLogRequest) -> Result<String, ClusterError>;
}
