//! Tool identities and categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownToolName(pub String);

/// Every tool the server exposes, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ConnectToEks,
    GetClusterInfo,
    GetResourceUsage,
    ListNamespaces,
    ListPods,
    DescribePod,
    ListServices,
    ListDeployments,
    GetPodLogs,
    ListHelmReleases,
    GetHelmRelease,
    GetHelmReleaseStatus,
    GetHelmReleaseHistory,
    Help,
}

impl ToolName {
    pub const ALL: [ToolName; 14] = [
        ToolName::ConnectToEks,
        ToolName::GetClusterInfo,
        ToolName::GetResourceUsage,
        ToolName::ListNamespaces,
        ToolName::ListPods,
        ToolName::DescribePod,
        ToolName::ListServices,
        ToolName::ListDeployments,
        ToolName::GetPodLogs,
        ToolName::ListHelmReleases,
        ToolName::GetHelmRelease,
        ToolName::GetHelmReleaseStatus,
        ToolName::GetHelmReleaseHistory,
        ToolName::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ConnectToEks => "connect_to_eks",
            ToolName::GetClusterInfo => "get_cluster_info",
            ToolName::GetResourceUsage => "get_resource_usage",
            ToolName::ListNamespaces => "list_namespaces",
            ToolName::ListPods => "list_pods",
            ToolName::DescribePod => "describe_pod",
            ToolName::ListServices => "list_services",
            ToolName::ListDeployments => "list_deployments",
            ToolName::GetPodLogs => "get_pod_logs",
            ToolName::ListHelmReleases => "list_helm_releases",
            ToolName::GetHelmRelease => "get_helm_release",
            ToolName::GetHelmReleaseStatus => "get_helm_release_status",
            ToolName::GetHelmReleaseHistory => "get_helm_release_history",
            ToolName::Help => "help",
        }
    }

    /// Only the connect tool and help run without an established session
    pub fn requires_session(&self) -> bool {
        !matches!(self, ToolName::ConnectToEks | ToolName::Help)
    }

    pub fn category(&self) -> Category {
        match self {
            ToolName::ConnectToEks => Category::Connection,
            ToolName::GetClusterInfo | ToolName::GetResourceUsage | ToolName::ListNamespaces => {
                Category::Cluster
            }
            ToolName::ListPods
            | ToolName::DescribePod
            | ToolName::ListServices
            | ToolName::ListDeployments
            | ToolName::GetPodLogs => Category::Resource,
            ToolName::ListHelmReleases
            | ToolName::GetHelmRelease
            | ToolName::GetHelmReleaseStatus
            | ToolName::GetHelmReleaseHistory => Category::Helm,
            ToolName::Help => Category::System,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownToolName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownToolName(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Help grouping of tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Connection,
    Cluster,
    Resource,
    Helm,
    System,
}

impl Category {
    pub const ALL: [Category; 5] =
        [Category::Connection, Category::Cluster, Category::Resource, Category::Helm, Category::System];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Connection => "connection",
            Category::Cluster => "cluster",
            Category::Resource => "resource",
            Category::Helm => "helm",
            Category::System => "system",
        }
    }

    /// Alternate names accepted on lookup
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Category::Connection => &[],
            Category::Cluster => &["cluster-info"],
            Category::Resource => &["resource-inspection", "resources"],
            Category::Helm => &["release-management", "releases"],
            Category::System => &["help"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Connection => "Connection Management",
            Category::Cluster => "Cluster Information",
            Category::Resource => "Resource Inspection",
            Category::Helm => "Helm Release Management",
            Category::System => "System",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Connection => "Establish a session with an EKS cluster",
            Category::Cluster => "Cluster-wide node, namespace and workload health overview",
            Category::Resource => "Inspect pods, services, deployments and pod logs",
            Category::Helm => "Inspect Helm releases, their status and revision history",
            Category::System => "Help and tool documentation",
        }
    }

    /// Tools in this category, in catalog order
    pub fn tools(self) -> impl Iterator<Item = ToolName> {
        ToolName::ALL.into_iter().filter(move |tool| tool.category() == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive, accepting keys and aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == needle || c.aliases().contains(&needle.as_str()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_round_trip_and_are_unique() {
        let names: HashSet<&str> = ToolName::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names.len(), ToolName::ALL.len());

        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
            assert_eq!(serde_json::to_value(tool).unwrap(), tool.as_str());
        }
        assert_eq!(
            "does_not_exist".parse::<ToolName>(),
            Err(UnknownToolName("does_not_exist".to_string()))
        );
    }

    #[test]
    fn test_session_requirement() {
        let free: Vec<ToolName> =
            ToolName::ALL.into_iter().filter(|t| !t.requires_session()).collect();
        assert_eq!(free, vec![ToolName::ConnectToEks, ToolName::Help]);
    }

    #[test]
    fn test_categories_partition_catalog() {
        let total: usize = Category::ALL.iter().map(|c| c.tools().count()).sum();
        assert_eq!(total, ToolName::ALL.len());

        assert_eq!(Category::Connection.tools().count(), 1);
        assert_eq!(Category::Cluster.tools().count(), 3);
        assert_eq!(Category::Resource.tools().count(), 5);
        assert_eq!(Category::Helm.tools().count(), 4);
        assert_eq!(Category::System.tools().collect::<Vec<_>>(), vec![ToolName::Help]);
    }

    #[test]
    fn test_category_lookup_accepts_aliases() {
        assert_eq!("helm".parse::<Category>().unwrap(), Category::Helm);
        assert_eq!("Release-Management".parse::<Category>().unwrap(), Category::Helm);
        assert_eq!("cluster-info".parse::<Category>().unwrap(), Category::Cluster);
        assert_eq!("resource-inspection".parse::<Category>().unwrap(), Category::Resource);
        assert_eq!("help".parse::<Category>().unwrap(), Category::System);
        assert!("storage".parse::<Category>().is_err());
    }
}
