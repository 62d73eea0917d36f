//! Namespaced workload inspection

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::cluster::{ClusterApi, PodLogRequest};
use crate::tools::args::{NamespaceArgs, PodArgs, PodLogsArgs};
use crate::tools::dispatcher::DispatchError;
use crate::tools::executors::failed;

#[instrument(skip(api, args), fields(namespace = %args.namespace), name = "execute_list_pods")]
pub async fn list_pods(api: &dyn ClusterApi, args: NamespaceArgs) -> Result<Value, DispatchError> {
    let pods = api.list_pods(Some(&args.namespace)).await.map_err(|e| failed("list pods", e))?;

    let pods: Vec<Value> = pods
        .iter()
        .map(|pod| {
            json!({
                "name": pod.metadata.name,
                "namespace": pod.metadata.namespace,
                "status": pod.phase(),
                "ready": pod.is_ready(),
                "restarts": pod.restart_count(),
                "age": pod.metadata.creation_timestamp,
            })
        })
        .collect();

    Ok(json!({ "namespace": args.namespace, "count": pods.len(), "pods": pods }))
}

#[instrument(skip(api, args), fields(pod = %args.pod_name, namespace = %args.namespace), name = "execute_describe_pod")]
pub async fn describe_pod(api: &dyn ClusterApi, args: PodArgs) -> Result<Value, DispatchError> {
    let pod = api
        .read_pod(&args.namespace, &args.pod_name)
        .await
        .map_err(|e| failed("describe pod", e))?;

    let spec = pod.spec.unwrap_or_default();
    let status = pod.status.unwrap_or_default();
    let containers: Vec<Value> = spec
        .containers
        .iter()
        .map(|c| json!({ "name": c.name, "image": c.image, "ports": c.ports, "env": c.env }))
        .collect();

    Ok(json!({
        "metadata": {
            "name": pod.metadata.name,
            "namespace": pod.metadata.namespace,
            "labels": pod.metadata.labels,
            "annotations": pod.metadata.annotations,
            "creationTimestamp": pod.metadata.creation_timestamp,
        },
        "spec": {
            "containers": containers,
            "restartPolicy": spec.restart_policy,
            "nodeName": spec.node_name,
        },
        "status": {
            "phase": status.phase,
            "conditions": status.conditions,
            "containerStatuses": status.container_statuses,
            "hostIP": status.host_ip,
            "podIP": status.pod_ip,
        },
    }))
}

#[instrument(skip(api, args), fields(namespace = %args.namespace), name = "execute_list_services")]
pub async fn list_services(api: &dyn ClusterApi, args: NamespaceArgs) -> Result<Value, DispatchError> {
    let services = api.list_services(&args.namespace).await.map_err(|e| failed("list services", e))?;

    let services: Vec<Value> = services
        .iter()
        .map(|svc| {
            let spec = svc.spec.as_ref();
            json!({
                "name": svc.metadata.name,
                "namespace": svc.metadata.namespace,
                "type": spec.and_then(|s| s.service_type.as_deref()),
                "clusterIP": spec.and_then(|s| s.cluster_ip.as_deref()),
                "ports": spec.and_then(|s| s.ports.as_ref()),
                "selector": spec.and_then(|s| s.selector.as_ref()),
            })
        })
        .collect();

    Ok(json!({ "namespace": args.namespace, "count": services.len(), "services": services }))
}

#[instrument(skip(api, args), fields(namespace = %args.namespace), name = "execute_list_deployments")]
pub async fn list_deployments(api: &dyn ClusterApi, args: NamespaceArgs) -> Result<Value, DispatchError> {
    let deployments =
        api.list_deployments(&args.namespace).await.map_err(|e| failed("list deployments", e))?;

    let deployments: Vec<Value> = deployments
        .iter()
        .map(|dep| {
            let status = dep.status.as_ref();
            json!({
                "name": dep.metadata.name,
                "namespace": dep.metadata.namespace,
                "replicas": {
                    "desired": dep.spec.as_ref().and_then(|s| s.replicas),
                    "ready": status.and_then(|s| s.ready_replicas),
                    "available": status.and_then(|s| s.available_replicas),
                    "updated": status.and_then(|s| s.updated_replicas),
                },
                "images": dep.images(),
                "creationTimestamp": dep.metadata.creation_timestamp,
            })
        })
        .collect();

    Ok(json!({ "namespace": args.namespace, "count": deployments.len(), "deployments": deployments }))
}

#[instrument(skip(api, args), fields(pod = %args.pod_name, namespace = %args.namespace), name = "execute_pod_logs")]
pub async fn pod_logs(api: &dyn ClusterApi, args: PodLogsArgs) -> Result<Value, DispatchError> {
    let request = PodLogRequest::from(args);
    let logs = api.read_pod_log(&request).await.map_err(|e| failed("get pod logs", e))?;
    debug!(bytes = logs.len(), tail_lines = request.tail_lines, "Read pod logs");

    Ok(json!({
        "podName": request.pod_name,
        "namespace": request.namespace,
        "container": request.container.as_deref().unwrap_or("default"),
        "tailLines": request.tail_lines,
        "logs": logs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockClusterApi};

    fn ns(name: &str) -> NamespaceArgs {
        NamespaceArgs { namespace: name.to_string() }
    }

    #[tokio::test]
    async fn test_list_pods_filters_namespace() {
        let api = MockClusterApi::new().with_pods(vec![
            fixtures::pod("web-1", "default", "Running", true, 2),
            fixtures::pod("api-1", "apps", "Running", true, 0),
        ]);

        let data = list_pods(&api, ns("default")).await.unwrap();
        assert_eq!(data["namespace"], "default");
        assert_eq!(data["count"], 1);
        assert_eq!(data["pods"][0]["name"], "web-1");
        assert_eq!(data["pods"][0]["ready"], true);
        assert_eq!(data["pods"][0]["restarts"], 2);
    }

    #[tokio::test]
    async fn test_describe_missing_pod() {
        let api = MockClusterApi::new();
        let err = describe_pod(&api, PodArgs { pod_name: "ghost".to_string(), namespace: "default".to_string() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("\"ghost\" not found"));
    }

    #[tokio::test]
    async fn test_describe_pod_shape() {
        let api = MockClusterApi::new().with_pods(vec![fixtures::pod("web-1", "default", "Running", true, 0)]);
        let data = describe_pod(&api, PodArgs { pod_name: "web-1".to_string(), namespace: "default".to_string() })
            .await
            .unwrap();
        assert_eq!(data["metadata"]["name"], "web-1");
        assert_eq!(data["status"]["phase"], "Running");
        assert_eq!(data["spec"]["containers"][0]["name"], "app");
    }

    #[tokio::test]
    async fn test_services_and_deployments() {
        let api = MockClusterApi::new()
            .with_services(vec![
                fixtures::service("web", "default", "ClusterIP"),
                fixtures::service("edge", "default", "LoadBalancer"),
            ])
            .with_deployments(vec![fixtures::deployment("web", "default", 3, 2, &["nginx:1.25"])]);

        let services = list_services(&api, ns("default")).await.unwrap();
        assert_eq!(services["count"], 2);
        assert_eq!(services["services"][1]["type"], "LoadBalancer");

        let deployments = list_deployments(&api, ns("default")).await.unwrap();
        assert_eq!(deployments["deployments"][0]["replicas"]["desired"], 3);
        assert_eq!(deployments["deployments"][0]["replicas"]["ready"], 2);
        assert_eq!(deployments["deployments"][0]["images"], json!(["nginx:1.25"]));
    }

    #[tokio::test]
    async fn test_pod_logs_records_request() {
        let api = MockClusterApi::new().with_logs("line one\nline two\n");
        let data = pod_logs(
            &api,
            PodLogsArgs {
                pod_name: "web-1".to_string(),
                namespace: "default".to_string(),
                container: None,
                tail_lines: 100,
            },
        )
        .await
        .unwrap();

        assert_eq!(data["container"], "default");
        assert_eq!(data["tailLines"], 100);
        assert_eq!(data["logs"], "line one\nline two\n");
        assert_eq!(api.log_requests()[0].tail_lines, 100);
    }
}
