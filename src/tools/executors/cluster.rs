//! Cluster-wide overview tools

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::cluster::ClusterApi;
use crate::tools::args::NamespaceFilter;
use crate::tools::dispatcher::DispatchError;
use crate::tools::executors::failed;

#[instrument(skip(api), name = "execute_cluster_info")]
pub async fn cluster_info(api: &dyn ClusterApi) -> Result<Value, DispatchError> {
    let (nodes, namespaces) = tokio::try_join!(api.list_nodes(), api.list_namespaces())
        .map_err(|e| failed("get cluster info", e))?;

    let nodes: Vec<Value> = nodes
        .iter()
        .map(|node| {
            json!({
                "name": node.metadata.name,
                "status": node.ready_status(),
                "version": node.kubelet_version(),
            })
        })
        .collect();

    Ok(json!({
        "nodeCount": nodes.len(),
        "namespaceCount": namespaces.len(),
        "nodes": nodes,
    }))
}

/// Pod phase counts, cluster-wide when no namespace is given
#[instrument(skip(api), name = "execute_resource_usage")]
pub async fn resource_usage(api: &dyn ClusterApi, args: NamespaceFilter) -> Result<Value, DispatchError> {
    let pods = api
        .list_pods(args.namespace.as_deref())
        .await
        .map_err(|e| failed("get resource usage", e))?;

    let count = |phase: &str| pods.iter().filter(|p| p.phase() == Some(phase)).count();
    debug!(pods = pods.len(), "Counted pods");

    let mut usage = json!({
        "totalPods": pods.len(),
        "runningPods": count("Running"),
        "pendingPods": count("Pending"),
        "failedPods": count("Failed"),
    });
    if let Some(namespace) = args.namespace {
        usage["namespace"] = json!(namespace);
    }
    Ok(usage)
}

#[instrument(skip(api), name = "execute_list_namespaces")]
pub async fn list_namespaces(api: &dyn ClusterApi) -> Result<Value, DispatchError> {
    let namespaces = api.list_namespaces().await.map_err(|e| failed("list namespaces", e))?;

    let namespaces: Vec<Value> = namespaces
        .iter()
        .map(|ns| {
            json!({
                "name": ns.metadata.name,
                "status": ns.phase(),
                "creationTimestamp": ns.metadata.creation_timestamp,
            })
        })
        .collect();

    Ok(json!({ "count": namespaces.len(), "namespaces": namespaces }))
}
