//! Per-tool summary templates
//!
//! A [`SummaryTemplate`] turns a tool's result data into a short human-oriented
//! summary. Templates are selected by [`ToolName`] through an exhaustive match, so
//! adding a tool without a template is a compile error; names outside the catalog get
//! [`FALLBACK`].

use serde_json::{json, Map, Value};

use crate::tools::catalog::ToolName;
use crate::tools::envelope::{Summary, SummaryFormat};

/// Static summary recipe for one tool
#[derive(Clone, Copy)]
pub struct SummaryTemplate {
    pub title: &'static str,
    pub description: fn(&Value) -> String,
    pub key_metrics: fn(&Value) -> Map<String, Value>,
    pub recommendations: fn(&Value) -> Vec<String>,
}

impl SummaryTemplate {
    pub fn render(&self, data: &Value, format: SummaryFormat) -> Summary {
        let recommendations = match format {
            SummaryFormat::Concise => None,
            SummaryFormat::Detailed => Some((self.recommendations)(data)),
        };

        Summary {
            title: self.title.to_string(),
            description: (self.description)(data),
            key_metrics: (self.key_metrics)(data),
            recommendations,
        }
    }
}

/// Summary for tools without a dedicated template
pub const FALLBACK: SummaryTemplate = SummaryTemplate {
    title: "Tool Execution Result",
    description: |_| "Tool executed successfully".to_string(),
    key_metrics: |_| Map::new(),
    recommendations: |_| vec!["Review the data for any issues or next steps".to_string()],
};

/// Summarize `data` for the tool named `tool_name`
pub fn summarize(tool_name: &str, data: &Value, format: SummaryFormat) -> Summary {
    let template = tool_name.parse::<ToolName>().map(template).unwrap_or(FALLBACK);
    template.render(data, format)
}

pub fn template(tool: ToolName) -> SummaryTemplate {
    match tool {
        ToolName::ConnectToEks => SummaryTemplate {
            title: "EKS Connection Status",
            description: |_| "Connection to EKS cluster established successfully".to_string(),
            key_metrics: |d| {
                metrics(json!({
                    "clusterName": d.get("clusterName"),
                    "region": d.get("region"),
                    "status": "Connected",
                }))
            },
            recommendations: |_| {
                strings(&[
                    "You can now use other tools to interact with the cluster",
                    "Use get_cluster_info to verify cluster details",
                ])
            },
        },
        ToolName::GetClusterInfo => SummaryTemplate {
            title: "Cluster Information",
            description: |d| {
                format!(
                    "Cluster overview with {} nodes and {} namespaces",
                    int(d, "nodeCount"),
                    int(d, "namespaceCount")
                )
            },
            key_metrics: |d| {
                metrics(json!({
                    "nodeCount": int(d, "nodeCount"),
                    "namespaceCount": int(d, "namespaceCount"),
                    "healthyNodes": count_where(d, "nodes", |n| str_of(n, "status") == Some("True")),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Check node status for any unhealthy nodes",
                    "Use get_resource_usage for detailed resource information",
                ])
            },
        },
        ToolName::GetResourceUsage => SummaryTemplate {
            title: "Resource Usage Summary",
            description: |d| match str_of(d, "namespace") {
                Some(ns) => format!("Resource utilization in namespace: {ns}"),
                None => "Resource utilization across the cluster".to_string(),
            },
            key_metrics: |d| {
                let total = int(d, "totalPods");
                let running = int(d, "runningPods");
                let success_rate = if total > 0 {
                    format!("{:.1}%", running as f64 / total as f64 * 100.0)
                } else {
                    "0%".to_string()
                };
                metrics(json!({
                    "totalPods": total,
                    "runningPods": running,
                    "pendingPods": int(d, "pendingPods"),
                    "failedPods": int(d, "failedPods"),
                    "successRate": success_rate,
                }))
            },
            recommendations: |d| {
                let failed = int(d, "failedPods");
                let pending = int(d, "pendingPods");
                vec![
                    if failed > 0 {
                        format!("Investigate {failed} failed pods")
                    } else {
                        "All pods are running successfully".to_string()
                    },
                    if pending > 0 {
                        format!("Monitor {pending} pending pods")
                    } else {
                        "No pending pods".to_string()
                    },
                ]
            },
        },
        ToolName::ListNamespaces => SummaryTemplate {
            title: "Namespace Overview",
            description: |d| format!("Found {} namespaces in the cluster", int(d, "count")),
            key_metrics: |d| {
                metrics(json!({
                    "totalNamespaces": int(d, "count"),
                    "activeNamespaces": count_where(d, "namespaces", |ns| str_of(ns, "status") == Some("Active")),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Review namespace status for any inactive namespaces",
                    "Use list_pods to explore resources in specific namespaces",
                ])
            },
        },
        ToolName::ListPods => SummaryTemplate {
            title: "Pod Status Overview",
            description: |d| format!("Pod status in namespace: {}", namespace_of(d)),
            key_metrics: |d| {
                metrics(json!({
                    "totalPods": int(d, "count"),
                    "readyPods": count_where(d, "pods", |p| bool_of(p, "ready")),
                    "runningPods": count_where(d, "pods", |p| str_of(p, "status") == Some("Running")),
                }))
            },
            recommendations: |d| {
                let not_ready = count_where(d, "pods", |p| !bool_of(p, "ready"));
                vec![
                    if not_ready > 0 {
                        "Some pods are not ready - investigate further".to_string()
                    } else {
                        "All pods are ready".to_string()
                    },
                    "Use describe_pod for detailed pod information".to_string(),
                ]
            },
        },
        ToolName::DescribePod => SummaryTemplate {
            title: "Pod Details",
            description: |d| {
                format!("Detailed information for pod: {}", pointer_str(d, "/metadata/name").unwrap_or("unknown"))
            },
            key_metrics: |d| {
                metrics(json!({
                    "podName": pointer_str(d, "/metadata/name"),
                    "namespace": pointer_str(d, "/metadata/namespace"),
                    "status": pointer_str(d, "/status/phase"),
                    "containerCount": d.pointer("/spec/containers").and_then(Value::as_array).map_or(0, Vec::len),
                }))
            },
            recommendations: |d| {
                let phase = pointer_str(d, "/status/phase").unwrap_or("Unknown");
                vec![
                    if phase == "Running" {
                        "Pod is running normally".to_string()
                    } else {
                        format!("Pod is in {phase} state - investigate")
                    },
                    "Use get_pod_logs to check pod logs if needed".to_string(),
                ]
            },
        },
        ToolName::ListServices => SummaryTemplate {
            title: "Service Overview",
            description: |d| format!("Services in namespace: {}", namespace_of(d)),
            key_metrics: |d| {
                metrics(json!({
                    "totalServices": int(d, "count"),
                    "clusterIPServices": count_where(d, "services", |s| str_of(s, "type") == Some("ClusterIP")),
                    "loadBalancerServices": count_where(d, "services", |s| str_of(s, "type") == Some("LoadBalancer")),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Review service types and configurations",
                    "Check service selectors for proper pod targeting",
                ])
            },
        },
        ToolName::ListDeployments => SummaryTemplate {
            title: "Deployment Overview",
            description: |d| format!("Deployments in namespace: {}", namespace_of(d)),
            key_metrics: |d| {
                let deployments = array(d, "deployments");
                let desired = |dep: &Value| dep.pointer("/replicas/desired").and_then(Value::as_i64);
                let ready = |dep: &Value| dep.pointer("/replicas/ready").and_then(Value::as_i64);
                metrics(json!({
                    "totalDeployments": int(d, "count"),
                    "readyDeployments": deployments.iter().filter(|dep| ready(*dep).unwrap_or(0) == desired(*dep).unwrap_or(0)).count(),
                    "totalReplicas": deployments.iter().filter_map(desired).sum::<i64>(),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Monitor deployment readiness and replica counts",
                    "Check deployment images for updates",
                ])
            },
        },
        ToolName::GetPodLogs => SummaryTemplate {
            title: "Pod Logs",
            description: |d| format!("Logs for pod: {}", str_of(d, "podName").unwrap_or("unknown")),
            key_metrics: |d| {
                metrics(json!({
                    "podName": d.get("podName"),
                    "namespace": d.get("namespace"),
                    "container": d.get("container"),
                    "logLines": int(d, "tailLines"),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Review logs for errors or warnings",
                    "Check log patterns for application health",
                ])
            },
        },
        ToolName::ListHelmReleases => SummaryTemplate {
            title: "Helm Release Overview",
            description: |d| format!("Found {} Helm releases", int(d, "totalReleases")),
            key_metrics: |d| {
                metrics(json!({
                    "totalReleases": int(d, "totalReleases"),
                    "deployedReleases": d.pointer("/summary/byStatus/deployed").and_then(Value::as_i64).unwrap_or(0),
                    "failedReleases": d.pointer("/summary/byStatus/failed").and_then(Value::as_i64).unwrap_or(0),
                    "namespaces": d.pointer("/summary/byNamespace").and_then(Value::as_object).map_or(0, Map::len),
                }))
            },
            recommendations: |d| {
                let failed = d.pointer("/summary/byStatus/failed").and_then(Value::as_i64).unwrap_or(0);
                vec![
                    if failed > 0 {
                        format!("Investigate {failed} failed releases")
                    } else {
                        "No failed releases".to_string()
                    },
                    "Use get_helm_release_status for release health details".to_string(),
                ]
            },
        },
        ToolName::GetHelmRelease => SummaryTemplate {
            title: "Helm Release Details",
            description: |d| {
                format!(
                    "Release {} in namespace: {}",
                    str_of(d, "releaseName").unwrap_or("unknown"),
                    namespace_of(d)
                )
            },
            key_metrics: |d| {
                metrics(json!({
                    "releaseName": d.get("releaseName"),
                    "status": d.pointer("/summary/status"),
                    "resourceCount": d.pointer("/summary/resourceCount").and_then(Value::as_i64).unwrap_or(0),
                    "hookCount": d.pointer("/summary/hookCount").and_then(Value::as_i64).unwrap_or(0),
                }))
            },
            recommendations: |_| {
                strings(&[
                    "Review release values for unexpected overrides",
                    "Use get_helm_release_history to inspect previous revisions",
                ])
            },
        },
        ToolName::GetHelmReleaseStatus => SummaryTemplate {
            title: "Helm Release Status",
            description: |d| {
                format!(
                    "Release {} is {}",
                    str_of(d, "releaseName").unwrap_or("unknown"),
                    str_of(d, "status").unwrap_or("unknown")
                )
            },
            key_metrics: |d| {
                metrics(json!({
                    "releaseName": d.get("releaseName"),
                    "status": d.get("status"),
                    "version": d.get("version"),
                    "resourceCount": d.pointer("/summary/resourceCount").and_then(Value::as_i64).unwrap_or(0),
                    "hookCount": d.pointer("/summary/hookCount").and_then(Value::as_i64).unwrap_or(0),
                }))
            },
            recommendations: |d| {
                let status = str_of(d, "status").unwrap_or("unknown");
                vec![
                    if status == "deployed" {
                        "Release is deployed".to_string()
                    } else {
                        format!("Release is in {status} state - investigate")
                    },
                    "Use describe_pod on release workloads for container details".to_string(),
                ]
            },
        },
        ToolName::GetHelmReleaseHistory => SummaryTemplate {
            title: "Helm Release History",
            description: |d| {
                format!(
                    "{} revisions for release: {}",
                    int(d, "totalRevisions"),
                    str_of(d, "releaseName").unwrap_or("unknown")
                )
            },
            key_metrics: |d| {
                metrics(json!({
                    "totalRevisions": int(d, "totalRevisions"),
                    "currentRevision": int(d, "currentRevision"),
                    "failedRevisions": d.pointer("/summary/failedRevisions").and_then(Value::as_i64).unwrap_or(0),
                    "lastDeployed": d.pointer("/summary/lastDeployed"),
                }))
            },
            recommendations: |d| {
                let failed = d.pointer("/summary/failedRevisions").and_then(Value::as_i64).unwrap_or(0);
                vec![
                    if failed > 0 {
                        format!("Review {failed} failed revisions")
                    } else {
                        "No failed revisions in history".to_string()
                    },
                    "Compare revision descriptions to track changes".to_string(),
                ]
            },
        },
        ToolName::Help => SummaryTemplate {
            title: "Help Information",
            description: |_| "Tool help and usage information".to_string(),
            key_metrics: |d| {
                let tool_count = match d.get("totalTools").and_then(Value::as_i64) {
                    Some(n) => n as usize,
                    None if d.get("tools").is_some() => array(d, "tools").len(),
                    None => 1,
                };
                let categories = match d.get("categories").and_then(Value::as_object) {
                    Some(map) => map.len(),
                    None => 1,
                };
                metrics(json!({ "toolCount": tool_count, "categories": categories }))
            },
            recommendations: |_| {
                strings(&[
                    "Use specific tool help for detailed information",
                    "Explore different tool categories for your needs",
                ])
            },
        },
    }
}

fn metrics(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn int(data: &Value, key: &str) -> i64 {
    data.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn str_of<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn bool_of(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn pointer_str<'a>(data: &'a Value, pointer: &str) -> Option<&'a str> {
    data.pointer(pointer).and_then(Value::as_str)
}

fn namespace_of(data: &Value) -> &str {
    str_of(data, "namespace").unwrap_or("default")
}

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn count_where(data: &Value, key: &str, pred: impl Fn(&Value) -> bool) -> usize {
    array(data, key).iter().filter(|item| pred(*item)).count()
}
