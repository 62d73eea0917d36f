//! Tool descriptors
//!
//! A [`ToolDescriptor`] is the immutable catalog entry for one tool: its identity,
//! description, argument schema and optional long-form help. The executor is bound
//! by [`ToolName`] in the dispatcher.

use crate::mcp::protocol::Tool;
use crate::tools::catalog::{Category, ToolName};
use crate::tools::schema::{ArgumentSchema, FieldSpec, FieldType};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_TAIL_LINES: i64 = 100;
pub const DEFAULT_HISTORY_MAX: i64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: &'static str,
    pub schema: ArgumentSchema,
    pub help_text: Option<&'static str>,
}

impl ToolDescriptor {
    pub fn new(name: ToolName, description: &'static str, schema: ArgumentSchema) -> Self {
        Self { name, description, schema, help_text: None }
    }

    pub fn with_help(mut self, help_text: &'static str) -> Self {
        self.help_text = Some(help_text);
        self
    }

    pub fn requires_session(&self) -> bool {
        self.name.requires_session()
    }

    pub fn category(&self) -> Category {
        self.name.category()
    }

    /// MCP `tools/list` entry
    pub fn to_mcp_tool(&self) -> Tool {
        Tool {
            name: self.name.as_str().to_string(),
            description: self.description.to_string(),
            input_schema: self.schema.to_json_schema(),
        }
    }

    /// Built-in descriptor for `name`
    pub fn builtin(name: ToolName) -> Self {
        match name {
            ToolName::ConnectToEks => Self::new(
                name,
                "Connect to an EKS cluster. Must be called before any cluster or Helm tool.",
                ArgumentSchema::new()
                    .field(FieldSpec::required("clusterName", FieldType::String, "Name of the EKS cluster"))
                    .field(FieldSpec::required(
                        "region",
                        FieldType::String,
                        "AWS region where the cluster is located",
                    ))
                    .field(FieldSpec::optional("roleArn", FieldType::String, "Optional IAM role ARN to assume")),
            )
            .with_help(
                "Authenticates with AWS, resolves the cluster endpoint and certificate, writes a \
                 kubeconfig entry for Helm and verifies access by listing namespaces. Calling it \
                 again replaces the current session.",
            ),
            ToolName::GetClusterInfo => {
                Self::new(name, "Get general cluster information: nodes, versions and namespace count", ArgumentSchema::new())
            }
            ToolName::GetResourceUsage => Self::new(
                name,
                "Get pod status counts across the cluster or within one namespace",
                ArgumentSchema::new().field(FieldSpec::optional(
                    "namespace",
                    FieldType::String,
                    "Specific namespace to check (all namespaces when omitted)",
                )),
            ),
            ToolName::ListNamespaces => {
                Self::new(name, "List all namespaces in the connected cluster", ArgumentSchema::new())
            }
            ToolName::ListPods => Self::new(
                name,
                "List pods in a specific namespace",
                ArgumentSchema::new().field(namespace("Namespace to list pods from")),
            ),
            ToolName::DescribePod => Self::new(
                name,
                "Get detailed information about a specific pod",
                ArgumentSchema::new()
                    .field(FieldSpec::required("podName", FieldType::String, "Name of the pod"))
                    .field(namespace("Namespace of the pod")),
            ),
            ToolName::ListServices => Self::new(
                name,
                "List services in a namespace",
                ArgumentSchema::new().field(namespace("Namespace to list services from")),
            ),
            ToolName::ListDeployments => Self::new(
                name,
                "List deployments in a namespace",
                ArgumentSchema::new().field(namespace("Namespace to list deployments from")),
            ),
            ToolName::GetPodLogs => Self::new(
                name,
                "Get logs from a specific pod",
                ArgumentSchema::new()
                    .field(FieldSpec::required("podName", FieldType::String, "Name of the pod"))
                    .field(namespace("Namespace of the pod"))
                    .field(FieldSpec::optional(
                        "container",
                        FieldType::String,
                        "Container name (required for multi-container pods)",
                    ))
                    .field(
                        FieldSpec::optional("tailLines", FieldType::Integer, "Number of lines to tail")
                            .with_default(DEFAULT_TAIL_LINES)
                            .with_minimum(1),
                    ),
            )
            .with_help(
                "Returns the last tailLines lines of the pod's log. Without a container the \
                 API server picks the pod's only container and rejects multi-container pods.",
            ),
            ToolName::ListHelmReleases => Self::new(
                name,
                "List Helm releases across all namespaces, optionally filtered by namespace and status",
                ArgumentSchema::new()
                    .field(FieldSpec::optional(
                        "namespace",
                        FieldType::String,
                        "Optional namespace to filter releases",
                    ))
                    .field(FieldSpec::optional(
                        "status",
                        FieldType::String,
                        "Optional status filter (deployed, failed, pending, etc.)",
                    )),
            ),
            ToolName::GetHelmRelease => Self::new(
                name,
                "Get detailed information about a specific Helm release: status, values and manifest",
                release_schema(),
            ),
            ToolName::GetHelmReleaseStatus => {
                Self::new(name, "Get the status of a specific Helm release", release_schema())
            }
            ToolName::GetHelmReleaseHistory => Self::new(
                name,
                "Get the revision history of a specific Helm release",
                release_schema().field(
                    FieldSpec::optional("max", FieldType::Integer, "Maximum number of revisions to return")
                        .with_default(DEFAULT_HISTORY_MAX)
                        .with_minimum(1),
                ),
            ),
            ToolName::Help => Self::new(
                name,
                "Get help about available tools, tool categories and parameters",
                ArgumentSchema::new()
                    .field(FieldSpec::optional("tool", FieldType::String, "Tool name to describe"))
                    .field(FieldSpec::optional(
                        "category",
                        FieldType::String,
                        "Category to list (connection, cluster, resource, helm, system)",
                    )),
            )
            .with_help("With no arguments lists every tool by category. `tool` takes precedence over `category`."),
        }
    }
}

fn namespace(description: &'static str) -> FieldSpec {
    FieldSpec::optional("namespace", FieldType::String, description).with_default(DEFAULT_NAMESPACE)
}

fn release_schema() -> ArgumentSchema {
    ArgumentSchema::new()
        .field(FieldSpec::required("releaseName", FieldType::String, "Name of the Helm release"))
        .field(namespace("Namespace of the Helm release"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_descriptors_match_names() {
        for tool in ToolName::ALL {
            let descriptor = ToolDescriptor::builtin(tool);
            assert_eq!(descriptor.name, tool);
            assert!(!descriptor.description.is_empty());
        }
    }

    #[test]
    fn test_connect_schema() {
        let tool = ToolDescriptor::builtin(ToolName::ConnectToEks).to_mcp_tool();
        assert_eq!(tool.name, "connect_to_eks");
        assert_eq!(tool.input_schema["required"], json!(["clusterName", "region"]));
        assert_eq!(tool.input_schema["properties"]["roleArn"]["type"], "string");
    }

    #[test]
    fn test_namespace_defaults() {
        for tool in [
            ToolName::ListPods,
            ToolName::DescribePod,
            ToolName::ListServices,
            ToolName::ListDeployments,
            ToolName::GetPodLogs,
            ToolName::GetHelmRelease,
            ToolName::GetHelmReleaseStatus,
            ToolName::GetHelmReleaseHistory,
        ] {
            let descriptor = ToolDescriptor::builtin(tool);
            let field = descriptor.schema.get("namespace").unwrap();
            assert_eq!(field.default, Some(json!("default")), "{tool}");
        }

        for tool in [ToolName::GetResourceUsage, ToolName::ListHelmReleases] {
            let descriptor = ToolDescriptor::builtin(tool);
            assert_eq!(descriptor.schema.get("namespace").unwrap().default, None, "{tool}");
        }
    }

    #[test]
    fn test_history_max_default() {
        let descriptor = ToolDescriptor::builtin(ToolName::GetHelmReleaseHistory);
        assert_eq!(descriptor.schema.get("max").unwrap().default, Some(json!(10)));
    }

    #[test]
    fn test_counts_must_be_positive() {
        let logs = ToolDescriptor::builtin(ToolName::GetPodLogs);
        let err = logs.schema.validate(&json!({"podName": "web-1", "tailLines": -5})).unwrap_err();
        assert_eq!(err.field(), "tailLines");

        let history = ToolDescriptor::builtin(ToolName::GetHelmReleaseHistory);
        assert!(history.schema.validate(&json!({"releaseName": "web", "max": 0})).is_err());
        assert!(history.schema.validate(&json!({"releaseName": "web", "max": 1})).is_ok());
    }
}
