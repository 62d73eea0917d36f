//! In-memory collaborators
//!
//! Deterministic [`ClusterApi`], [`HelmClient`] and [`Authenticator`] implementations
//! used by the unit and integration tests. Each records the calls it receives so
//! tests can assert on resolved arguments.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::cluster::{ClusterApi, ClusterError, Deployment, Namespace, Node, Pod, PodLogRequest, Service};
use crate::helm::{HelmClient, HelmError, ReleaseRevision, ReleaseStatus, ReleaseSummary};
use crate::session::{ApiHandles, Authenticator, ConnectRequest};
use crate::utils::CommandError;

fn record<T>(log: &Mutex<Vec<T>>, item: T) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(item);
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Cluster API backed by fixed object lists
#[derive(Debug, Default)]
pub struct MockClusterApi {
    namespaces: Vec<Namespace>,
    nodes: Vec<Node>,
    pods: Vec<Pod>,
    services: Vec<Service>,
    deployments: Vec<Deployment>,
    logs: String,
    failure: Option<String>,
    calls: AtomicUsize,
    log_requests: Mutex<Vec<PodLogRequest>>,
}

impl MockClusterApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active namespaces with the given names
    pub fn with_namespaces(names: &[&str]) -> Self {
        Self { namespaces: names.iter().map(|n| fixtures::namespace(n)).collect(), ..Self::default() }
    }

    /// Every call fails with a 403 carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), ..Self::default() }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_pods(mut self, pods: Vec<Pod>) -> Self {
        self.pods = pods;
        self
    }

    pub fn with_services(mut self, services: Vec<Service>) -> Self {
        self.services = services;
        self
    }

    pub fn with_deployments(mut self, deployments: Vec<Deployment>) -> Self {
        self.deployments = deployments;
        self
    }

    pub fn with_logs(mut self, logs: impl Into<String>) -> Self {
        self.logs = logs.into();
        self
    }

    /// Number of API calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Log requests received, in order
    pub fn log_requests(&self) -> Vec<PodLogRequest> {
        snapshot(&self.log_requests)
    }

    fn enter(&self) -> Result<(), ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(ClusterError::Api { status: 403, message: message.clone() }),
            None => Ok(()),
        }
    }

    fn in_namespace<'a, T, F>(items: &'a [T], namespace: &'a str, meta: F) -> impl Iterator<Item = &'a T>
    where
        F: Fn(&T) -> Option<&str> + 'a,
    {
        items.iter().filter(move |item| meta(item) == Some(namespace))
    }
}

#[async_trait]
impl ClusterApi for MockClusterApi {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        self.enter()?;
        Ok(self.namespaces.clone())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        self.enter()?;
        Ok(self.nodes.clone())
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        self.enter()?;
        Ok(match namespace {
            Some(ns) => Self::in_namespace(&self.pods, ns, |p| p.metadata.namespace.as_deref()).cloned().collect(),
            None => self.pods.clone(),
        })
    }

    async fn read_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        self.enter()?;
        Self::in_namespace(&self.pods, namespace, |p| p.metadata.namespace.as_deref())
            .find(|p| p.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| ClusterError::Api { status: 404, message: format!("pods \"{name}\" not found") })
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        self.enter()?;
        Ok(Self::in_namespace(&self.services, namespace, |s| s.metadata.namespace.as_deref()).cloned().collect())
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        self.enter()?;
        Ok(Self::in_namespace(&self.deployments, namespace, |d| d.metadata.namespace.as_deref())
            .cloned()
            .collect())
    }

    async fn read_pod_log(&self, request: &PodLogRequest) -> Result<String, ClusterError> {
        self.enter()?;
        record(&self.log_requests, request.clone());
        Ok(self.logs.clone())
    }
}

/// Helm client backed by fixed releases
#[derive(Debug)]
pub struct MockHelmClient {
    releases: Vec<ReleaseSummary>,
    statuses: BTreeMap<String, ReleaseStatus>,
    histories: BTreeMap<String, Vec<ReleaseRevision>>,
    values: Value,
    manifest: String,
    failure: Option<String>,
    history_requests: Mutex<Vec<(String, String, i64)>>,
}

impl Default for MockHelmClient {
    fn default() -> Self {
        Self {
            releases: Vec::new(),
            statuses: BTreeMap::new(),
            histories: BTreeMap::new(),
            values: json!({ "replicaCount": 2, "image": { "tag": "1.25" } }),
            manifest: "---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n".to_string(),
            failure: None,
            history_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockHelmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command exits non-zero with `stderr`
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self { failure: Some(stderr.into()), ..Self::default() }
    }

    pub fn with_release(mut self, release: ReleaseSummary) -> Self {
        self.releases.push(release);
        self
    }

    pub fn with_status(mut self, status: ReleaseStatus) -> Self {
        self.statuses.insert(status.name.clone(), status);
        self
    }

    pub fn with_history(mut self, release: &str, revisions: Vec<ReleaseRevision>) -> Self {
        self.histories.insert(release.to_string(), revisions);
        self
    }

    /// `(release, namespace, max)` of each history call
    pub fn history_requests(&self) -> Vec<(String, String, i64)> {
        snapshot(&self.history_requests)
    }

    fn enter(&self) -> Result<(), HelmError> {
        match &self.failure {
            Some(stderr) => Err(helm_failure(stderr)),
            None => Ok(()),
        }
    }

    fn known(&self, release: &str) -> Result<&ReleaseStatus, HelmError> {
        self.statuses.get(release).ok_or_else(|| helm_failure("Error: release: not found"))
    }
}

fn helm_failure(stderr: &str) -> HelmError {
    HelmError::Command(CommandError::Failed { program: "helm".to_string(), status: 1, stderr: stderr.to_string() })
}

#[async_trait]
impl HelmClient for MockHelmClient {
    async fn list_releases(&self, namespace: Option<&str>) -> Result<Vec<ReleaseSummary>, HelmError> {
        self.enter()?;
        Ok(self.releases.iter().filter(|r| namespace.is_none_or(|ns| r.namespace == ns)).cloned().collect())
    }

    async fn status(&self, release: &str, _namespace: &str) -> Result<ReleaseStatus, HelmError> {
        self.enter()?;
        self.known(release).cloned()
    }

    async fn values(&self, release: &str, _namespace: &str) -> Result<Value, HelmError> {
        self.enter()?;
        self.known(release)?;
        Ok(self.values.clone())
    }

    async fn manifest(&self, release: &str, _namespace: &str) -> Result<String, HelmError> {
        self.enter()?;
        self.known(release)?;
        Ok(self.manifest.clone())
    }

    /// Most recent `max` revisions, oldest first, as `helm history --max` returns them
    async fn history(&self, release: &str, namespace: &str, max: i64) -> Result<Vec<ReleaseRevision>, HelmError> {
        self.enter()?;
        record(&self.history_requests, (release.to_string(), namespace.to_string(), max));
        let revisions = self.histories.get(release).ok_or_else(|| helm_failure("Error: release: not found"))?;
        let keep = usize::try_from(max).unwrap_or(0).min(revisions.len());
        Ok(revisions[revisions.len() - keep..].to_vec())
    }
}

/// Authenticator returning shared mock handles
#[derive(Debug)]
pub struct MockAuthenticator {
    cluster: Arc<MockClusterApi>,
    helm: Arc<MockHelmClient>,
    rejection: Option<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ConnectRequest>>,
}

impl MockAuthenticator {
    pub fn new(cluster: MockClusterApi) -> Self {
        Self::with_clients(Arc::new(cluster), Arc::new(MockHelmClient::new()))
    }

    pub fn with_clients(cluster: Arc<MockClusterApi>, helm: Arc<MockHelmClient>) -> Self {
        Self { cluster, helm, rejection: None, delay: None, requests: Mutex::new(Vec::new()) }
    }

    /// Authentication always fails with `message`
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self { rejection: Some(message.into()), ..Self::new(MockClusterApi::new()) }
    }

    /// Sleep before answering, to hold a connect attempt in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cluster(&self) -> Arc<MockClusterApi> {
        Arc::clone(&self.cluster)
    }

    pub fn helm(&self) -> Arc<MockHelmClient> {
        Arc::clone(&self.helm)
    }

    pub fn requests(&self) -> Vec<ConnectRequest> {
        snapshot(&self.requests)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, request: &ConnectRequest) -> Result<ApiHandles, ClusterError> {
        record(&self.requests, request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.rejection {
            Some(message) => Err(ClusterError::Auth(message.clone())),
            None => Ok(ApiHandles::new(self.cluster(), self.helm())),
        }
    }
}

/// Object builders for tests
pub mod fixtures {
    use crate::cluster::types::{
        Container, ContainerStatus, DeploymentSpec, DeploymentStatus, NamespaceStatus, NodeCondition,
        NodeStatus, NodeSystemInfo, ObjectMeta, PodSpec, PodStatus, PodTemplateSpec, ServiceSpec,
    };
    use crate::cluster::{Deployment, Namespace, Node, Pod, Service};
    use crate::helm::{ReleaseHook, ReleaseInfo, ReleaseRevision, ReleaseStatus, ReleaseSummary};
    use serde_json::json;
    use std::collections::BTreeMap;

    const CREATED: &str = "2024-05-01T10:00:00Z";

    fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: namespace.map(str::to_string),
            creation_timestamp: Some(CREATED.to_string()),
            ..ObjectMeta::default()
        }
    }

    pub fn namespace(name: &str) -> Namespace {
        Namespace { metadata: meta(name, None), status: Some(NamespaceStatus { phase: Some("Active".to_string()) }) }
    }

    pub fn node(name: &str, ready: bool, kubelet_version: &str) -> Node {
        Node {
            metadata: meta(name, None),
            status: Some(NodeStatus {
                conditions: vec![NodeCondition {
                    condition_type: "Ready".to_string(),
                    status: if ready { "True" } else { "False" }.to_string(),
                }],
                node_info: Some(NodeSystemInfo { kubelet_version: Some(kubelet_version.to_string()) }),
            }),
        }
    }

    /// Single-container pod named `app`
    pub fn pod(name: &str, namespace: &str, phase: &str, ready: bool, restarts: i64) -> Pod {
        Pod {
            metadata: meta(name, Some(namespace)),
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "app".to_string(),
                    image: Some("nginx:1.25".to_string()),
                    ..Container::default()
                }],
                restart_policy: Some("Always".to_string()),
                node_name: Some("ip-10-0-1-10".to_string()),
            }),
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "app".to_string(),
                    ready,
                    restart_count: restarts,
                    ..ContainerStatus::default()
                }]),
                ..PodStatus::default()
            }),
        }
    }

    pub fn service(name: &str, namespace: &str, service_type: &str) -> Service {
        Service {
            metadata: meta(name, Some(namespace)),
            spec: Some(ServiceSpec {
                service_type: Some(service_type.to_string()),
                cluster_ip: Some("10.100.0.10".to_string()),
                ports: Some(vec![json!({"port": 80, "protocol": "TCP"})]),
                selector: Some(BTreeMap::from([("app".to_string(), name.to_string())])),
            }),
        }
    }

    pub fn deployment(name: &str, namespace: &str, desired: i64, ready: i64, images: &[&str]) -> Deployment {
        let containers = images
            .iter()
            .enumerate()
            .map(|(i, image)| Container {
                name: format!("c{i}"),
                image: Some(image.to_string()),
                ..Container::default()
            })
            .collect();

        Deployment {
            metadata: meta(name, Some(namespace)),
            spec: Some(DeploymentSpec {
                replicas: Some(desired),
                template: Some(PodTemplateSpec {
                    spec: Some(PodSpec { containers, ..PodSpec::default() }),
                }),
            }),
            status: Some(DeploymentStatus {
                ready_replicas: Some(ready),
                available_replicas: Some(ready),
                updated_replicas: Some(desired),
            }),
        }
    }

    pub fn release(name: &str, namespace: &str, status: &str) -> ReleaseSummary {
        ReleaseSummary {
            name: name.to_string(),
            namespace: namespace.to_string(),
            revision: "1".to_string(),
            updated: "2024-05-01 10:00:00.000000 +0000 UTC".to_string(),
            status: status.to_string(),
            chart: format!("{name}-1.0.0"),
            app_version: "1.0.0".to_string(),
        }
    }

    /// Release at version 3 with a Service, a Deployment and one test hook
    pub fn release_status(name: &str, namespace: &str, status: &str) -> ReleaseStatus {
        let resources = BTreeMap::from([
            ("v1/Service".to_string(), vec![json!({"kind": "Service", "metadata": {"name": name}})]),
            ("apps/v1/Deployment".to_string(), vec![json!({"kind": "Deployment", "metadata": {"name": name}})]),
        ]);

        ReleaseStatus {
            name: name.to_string(),
            namespace: namespace.to_string(),
            version: 3,
            info: ReleaseInfo {
                first_deployed: Some("2024-04-01T10:00:00Z".to_string()),
                last_deployed: Some(CREATED.to_string()),
                description: Some("Upgrade complete".to_string()),
                status: status.to_string(),
                notes: None,
                resources: Some(resources),
            },
            hooks: vec![ReleaseHook {
                name: format!("{name}-test"),
                kind: "Pod".to_string(),
                path: format!("{name}/templates/tests/test-connection.yaml"),
                events: vec!["test".to_string()],
            }],
        }
    }

    pub fn revision(revision: i64, status: &str) -> ReleaseRevision {
        ReleaseRevision {
            revision,
            updated: format!("2024-05-{revision:02}T10:00:00Z"),
            status: status.to_string(),
            chart: "web-1.0.0".to_string(),
            app_version: "1.0.0".to_string(),
            description: format!("Revision {revision}"),
        }
    }
}
