//! # Help
//!
//! Read-only documentation generated from the registry. Three views are available:
//! the whole catalog grouped by category, one category with formatted parameters,
//! and one tool with usage examples. No cluster calls are made.

use serde_json::{json, Value};
use thiserror::Error;

use crate::tools::args::HelpArgs;
use crate::tools::catalog::{Category, ToolName};
use crate::tools::descriptor::ToolDescriptor;
use crate::tools::registry::ToolRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Unknown tool: {0}. Use help without arguments to list available tools")]
    UnknownTool(String),

    #[error("Unknown category: {0}. Available categories: connection, cluster, resource, helm, system")]
    UnknownCategory(String),
}

/// Resolve a help request; `tool` takes precedence over `category`
pub fn help(registry: &ToolRegistry, args: &HelpArgs) -> Result<Value, LookupError> {
    match (&args.tool, &args.category) {
        (Some(tool), _) => tool_help(registry, tool),
        (None, Some(category)) => category_help(registry, category),
        (None, None) => Ok(overview(registry)),
    }
}

pub fn overview(registry: &ToolRegistry) -> Value {
    let mut categories = serde_json::Map::new();
    for category in Category::ALL {
        let tools: Vec<Value> = registry
            .by_category(category)
            .map(|d| json!({ "name": d.name, "description": d.description }))
            .collect();
        categories.insert(
            category.key().to_string(),
            json!({
                "title": category.title(),
                "description": category.description(),
                "tools": tools,
            }),
        );
    }

    json!({
        "totalTools": registry.len(),
        "categories": categories,
        "usage": "Call connect_to_eks first, then any cluster or Helm tool. \
                  Use help with {\"tool\": name} or {\"category\": name} for details.",
    })
}

pub fn category_help(registry: &ToolRegistry, name: &str) -> Result<Value, LookupError> {
    let category: Category = name.parse().map_err(|_| LookupError::UnknownCategory(name.to_string()))?;

    let tools: Vec<Value> = registry
        .by_category(category)
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "parameters": parameters(d),
                "requiresConnection": d.requires_session(),
            })
        })
        .collect();

    Ok(json!({
        "category": category.key(),
        "title": category.title(),
        "description": category.description(),
        "tools": tools,
    }))
}

pub fn tool_help(registry: &ToolRegistry, name: &str) -> Result<Value, LookupError> {
    let descriptor = registry.find_tool(name).ok_or_else(|| LookupError::UnknownTool(name.to_string()))?;

    let mut detail = json!({
        "name": descriptor.name,
        "description": descriptor.description,
        "category": descriptor.category().key(),
        "parameters": parameters(descriptor),
        "examples": examples(descriptor.name),
        "requiresConnection": descriptor.requires_session(),
    });
    if let Some(help_text) = descriptor.help_text {
        detail["helpText"] = json!(help_text);
    }
    Ok(detail)
}

fn parameters(descriptor: &ToolDescriptor) -> Vec<String> {
    descriptor.schema.fields().iter().map(|f| f.describe()).collect()
}

/// Static usage examples for each tool
pub fn examples(tool: ToolName) -> Vec<Value> {
    let pairs: Vec<(&str, Value)> = match tool {
        ToolName::ConnectToEks => vec![
            ("Connect with the default credential chain", json!({"clusterName": "prod", "region": "us-west-2"})),
            (
                "Connect by assuming a read-only role",
                json!({"clusterName": "prod", "region": "us-west-2", "roleArn": "arn:aws:iam::123456789012:role/eks-readonly"}),
            ),
        ],
        ToolName::GetClusterInfo => vec![("Show nodes and namespace count", json!({}))],
        ToolName::GetResourceUsage => vec![
            ("Pod status across the cluster", json!({})),
            ("Pod status in one namespace", json!({"namespace": "kube-system"})),
        ],
        ToolName::ListNamespaces => vec![("List every namespace", json!({}))],
        ToolName::ListPods => vec![
            ("Pods in the default namespace", json!({})),
            ("Pods in kube-system", json!({"namespace": "kube-system"})),
        ],
        ToolName::DescribePod => {
            vec![("Describe a pod", json!({"podName": "web-7d4b9c", "namespace": "default"}))]
        }
        ToolName::ListServices => vec![("Services in a namespace", json!({"namespace": "default"}))],
        ToolName::ListDeployments => vec![("Deployments in a namespace", json!({"namespace": "default"}))],
        ToolName::GetPodLogs => vec![
            ("Last 100 lines of a pod's log", json!({"podName": "web-7d4b9c"})),
            (
                "Last 50 lines of one container",
                json!({"podName": "web-7d4b9c", "container": "nginx", "tailLines": 50}),
            ),
        ],
        ToolName::ListHelmReleases => vec![
            ("Every release in the cluster", json!({})),
            ("Failed releases in one namespace", json!({"namespace": "apps", "status": "failed"})),
        ],
        ToolName::GetHelmRelease => {
            vec![("Status, values and manifest of a release", json!({"releaseName": "web", "namespace": "apps"}))]
        }
        ToolName::GetHelmReleaseStatus => {
            vec![("Status of a release", json!({"releaseName": "web", "namespace": "apps"}))]
        }
        ToolName::GetHelmReleaseHistory => vec![(
            "Last 5 revisions of a release",
            json!({"releaseName": "web", "namespace": "apps", "max": 5}),
        )],
        ToolName::Help => vec![
            ("Catalog overview", json!({})),
            ("Tools in a category", json!({"category": "helm"})),
            ("One tool in detail", json!({"tool": "get_pod_logs"})),
        ],
    };

    pairs
        .into_iter()
        .map(|(description, arguments)| json!({ "description": description, "arguments": arguments }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::catalog;

    fn args(tool: Option<&str>, category: Option<&str>) -> HelpArgs {
        HelpArgs { tool: tool.map(str::to_string), category: category.map(str::to_string) }
    }

    #[test]
    fn test_overview_lists_every_tool() {
        let value = help(catalog(), &HelpArgs::default()).unwrap();
        assert_eq!(value["totalTools"], 14);

        let listed: usize = value["categories"]
            .as_object()
            .unwrap()
            .values()
            .map(|c| c["tools"].as_array().unwrap().len())
            .sum();
        assert_eq!(listed, 14);
        assert_eq!(value["categories"]["connection"]["tools"][0]["name"], "connect_to_eks");
    }

    #[test]
    fn test_category_help_formats_parameters() {
        let value = help(catalog(), &args(None, Some("resource-inspection"))).unwrap();
        assert_eq!(value["category"], "resource");

        let logs = value["tools"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "get_pod_logs")
            .unwrap();
        assert_eq!(logs["requiresConnection"], true);
        assert!(logs["parameters"]
            .as_array()
            .unwrap()
            .contains(&json!("tailLines (integer, optional, default: 100): Number of lines to tail")));
    }

    #[test]
    fn test_tool_wins_over_category() {
        let value = help(catalog(), &args(Some("connect_to_eks"), Some("helm"))).unwrap();
        assert_eq!(value["name"], "connect_to_eks");
        assert_eq!(value["requiresConnection"], false);
        assert!(value.get("helpText").is_some());
        assert_eq!(value["examples"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(
            help(catalog(), &args(Some("kubectl"), None)).unwrap_err(),
            LookupError::UnknownTool("kubectl".to_string())
        );
        assert_eq!(
            help(catalog(), &args(None, Some("storage"))).unwrap_err(),
            LookupError::UnknownCategory("storage".to_string())
        );
    }

    #[test]
    fn test_every_tool_has_examples() {
        for tool in ToolName::ALL {
            assert!(!examples(tool).is_empty(), "{tool}");
        }
    }
}
