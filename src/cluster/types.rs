//! Kubernetes object model
//!
//! The subset of core/v1 and apps/v1 fields the inspection tools read. Every field
//! defaults so partially populated API objects still decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Generic list wrapper (`NamespaceList`, `PodList`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: Option<BTreeMap<String, String>>,
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Namespace {
    pub metadata: ObjectMeta,
    pub status: Option<NamespaceStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceStatus {
    pub phase: Option<String>,
}

impl Namespace {
    pub fn phase(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.phase.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub metadata: ObjectMeta,
    pub status: Option<NodeStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStatus {
    pub conditions: Vec<NodeCondition>,
    pub node_info: Option<NodeSystemInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSystemInfo {
    pub kubelet_version: Option<String>,
}

impl Node {
    /// Status of the `Ready` condition ("True", "False", "Unknown")
    pub fn ready_status(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| {
            s.conditions.iter().find(|c| c.condition_type == "Ready").map(|c| c.status.as_str())
        })
    }

    pub fn kubelet_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.node_info.as_ref())
            .and_then(|i| i.kubelet_version.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pod {
    pub metadata: ObjectMeta,
    pub spec: Option<PodSpec>,
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodSpec {
    pub containers: Vec<Container>,
    pub restart_policy: Option<String>,
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub name: String,
    pub image: Option<String>,
    pub ports: Option<Vec<Value>>,
    pub env: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodStatus {
    pub phase: Option<String>,
    pub conditions: Option<Vec<Value>>,
    pub container_statuses: Option<Vec<ContainerStatus>>,
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStatus {
    pub name: String,
    pub ready: bool,
    pub restart_count: i64,
    pub image: Option<String>,
    pub state: Option<Value>,
}

impl Pod {
    pub fn phase(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.phase.as_deref())
    }

    /// A pod is ready when it reports container statuses and all of them are ready.
    pub fn is_ready(&self) -> bool {
        match self.status.as_ref().and_then(|s| s.container_statuses.as_ref()) {
            Some(statuses) if !statuses.is_empty() => statuses.iter().all(|cs| cs.ready),
            _ => false,
        }
    }

    pub fn restart_count(&self) -> i64 {
        self.status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| statuses.iter().map(|cs| cs.restart_count).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub metadata: ObjectMeta,
    pub spec: Option<ServiceSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    pub ports: Option<Vec<Value>>,
    pub selector: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    pub metadata: ObjectMeta,
    pub spec: Option<DeploymentSpec>,
    pub status: Option<DeploymentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    pub replicas: Option<i64>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodTemplateSpec {
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStatus {
    pub ready_replicas: Option<i64>,
    pub available_replicas: Option<i64>,
    pub updated_replicas: Option<i64>,
}

impl Deployment {
    pub fn images(&self) -> Vec<String> {
        self.spec
            .as_ref()
            .and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref())
            .map(|spec| spec.containers.iter().filter_map(|c| c.image.clone()).collect())
            .unwrap_or_default()
    }
}

/// Parameters of a pod log read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodLogRequest {
    pub pod_name: String,
    pub namespace: String,
    pub container: Option<String>,
    pub tail_lines: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_decodes_api_shape() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "web-1", "namespace": "default", "creationTimestamp": "2024-01-01T00:00:00Z"},
            "spec": {"containers": [{"name": "web", "image": "nginx:1.25"}], "nodeName": "ip-10-0-0-1"},
            "status": {
                "phase": "Running",
                "podIP": "10.0.0.12",
                "containerStatuses": [
                    {"name": "web", "ready": true, "restartCount": 2},
                    {"name": "sidecar", "ready": true, "restartCount": 1}
                ]
            }
        }))
        .unwrap();

        assert_eq!(pod.phase(), Some("Running"));
        assert!(pod.is_ready());
        assert_eq!(pod.restart_count(), 3);
        assert_eq!(pod.status.unwrap().pod_ip.as_deref(), Some("10.0.0.12"));
    }

    #[test]
    fn test_pod_without_statuses_is_not_ready() {
        let pod: Pod = serde_json::from_value(json!({"metadata": {"name": "pending"}})).unwrap();
        assert!(!pod.is_ready());
        assert_eq!(pod.restart_count(), 0);
        assert_eq!(pod.phase(), None);
    }

    #[test]
    fn test_node_ready_condition() {
        let node: Node = serde_json::from_value(json!({
            "metadata": {"name": "node-a"},
            "status": {
                "conditions": [
                    {"type": "MemoryPressure", "status": "False"},
                    {"type": "Ready", "status": "True"}
                ],
                "nodeInfo": {"kubeletVersion": "v1.29.3-eks"}
            }
        }))
        .unwrap();

        assert_eq!(node.ready_status(), Some("True"));
        assert_eq!(node.kubelet_version(), Some("v1.29.3-eks"));
    }

    #[test]
    fn test_service_and_deployment_fields() {
        let svc: Service = serde_json::from_value(json!({
            "metadata": {"name": "api"},
            "spec": {"type": "LoadBalancer", "clusterIP": "172.20.0.10"}
        }))
        .unwrap();
        let spec = svc.spec.unwrap();
        assert_eq!(spec.service_type.as_deref(), Some("LoadBalancer"));
        assert_eq!(spec.cluster_ip.as_deref(), Some("172.20.0.10"));

        let dep: Deployment = serde_json::from_value(json!({
            "metadata": {"name": "api"},
            "spec": {"replicas": 3, "template": {"spec": {"containers": [
                {"name": "api", "image": "api:1"}, {"name": "proxy", "image": "envoy:1"}
            ]}}},
            "status": {"readyReplicas": 3}
        }))
        .unwrap();
        assert_eq!(dep.images(), vec!["api:1".to_string(), "envoy:1".to_string()]);
    }
}
