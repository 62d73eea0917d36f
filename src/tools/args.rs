//! Typed argument records
//!
//! Arguments are validated against the tool's [`ArgumentSchema`](crate::tools::schema::ArgumentSchema)
//! first, so defaults are already applied when these records are built.

use serde::Deserialize;

use crate::cluster::PodLogRequest;
use crate::session::ConnectRequest;
use crate::tools::catalog::ToolName;
use crate::tools::schema::{ValidatedArgs, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectArgs {
    pub cluster_name: String,
    pub region: String,
    #[serde(default)]
    pub role_arn: Option<String>,
}

impl From<ConnectArgs> for ConnectRequest {
    fn from(args: ConnectArgs) -> Self {
        ConnectRequest { cluster_name: args.cluster_name, region: args.region, role_arn: args.role_arn }
    }
}

/// Optional namespace; `None` spans all namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamespaceFilter {
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamespaceArgs {
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodArgs {
    pub pod_name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodLogsArgs {
    pub pod_name: String,
    pub namespace: String,
    #[serde(default)]
    pub container: Option<String>,
    pub tail_lines: i64,
}

impl From<PodLogsArgs> for PodLogRequest {
    fn from(args: PodLogsArgs) -> Self {
        PodLogRequest {
            pod_name: args.pod_name,
            namespace: args.namespace,
            container: args.container,
            tail_lines: args.tail_lines,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseListArgs {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseArgs {
    pub release_name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseHistoryArgs {
    pub release_name: String,
    pub namespace: String,
    pub max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HelpArgs {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated call, one variant per tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    ConnectToEks(ConnectArgs),
    GetClusterInfo,
    GetResourceUsage(NamespaceFilter),
    ListNamespaces,
    ListPods(NamespaceArgs),
    DescribePod(PodArgs),
    ListServices(NamespaceArgs),
    ListDeployments(NamespaceArgs),
    GetPodLogs(PodLogsArgs),
    ListHelmReleases(ReleaseListArgs),
    GetHelmRelease(ReleaseArgs),
    GetHelmReleaseStatus(ReleaseArgs),
    GetHelmReleaseHistory(ReleaseHistoryArgs),
    Help(HelpArgs),
}

impl ToolRequest {
    pub fn from_validated(tool: ToolName, args: ValidatedArgs) -> Result<Self, ValidationError> {
        Ok(match tool {
            ToolName::ConnectToEks => ToolRequest::ConnectToEks(args.into_typed()?),
            ToolName::GetClusterInfo => ToolRequest::GetClusterInfo,
            ToolName::GetResourceUsage => ToolRequest::GetResourceUsage(args.into_typed()?),
            ToolName::ListNamespaces => ToolRequest::ListNamespaces,
            ToolName::ListPods => ToolRequest::ListPods(args.into_typed()?),
            ToolName::DescribePod => ToolRequest::DescribePod(args.into_typed()?),
            ToolName::ListServices => ToolRequest::ListServices(args.into_typed()?),
            ToolName::ListDeployments => ToolRequest::ListDeployments(args.into_typed()?),
            ToolName::GetPodLogs => ToolRequest::GetPodLogs(args.into_typed()?),
            ToolName::ListHelmReleases => ToolRequest::ListHelmReleases(args.into_typed()?),
            ToolName::GetHelmRelease => ToolRequest::GetHelmRelease(args.into_typed()?),
            ToolName::GetHelmReleaseStatus => ToolRequest::GetHelmReleaseStatus(args.into_typed()?),
            ToolName::GetHelmReleaseHistory => ToolRequest::GetHelmReleaseHistory(args.into_typed()?),
            ToolName::Help => ToolRequest::Help(args.into_typed()?),
        })
    }

    pub fn tool_name(&self) -> ToolName {
        match self {
            ToolRequest::ConnectToEks(_) => ToolName::ConnectToEks,
            ToolRequest::GetClusterInfo => ToolName::GetClusterInfo,
            ToolRequest::GetResourceUsage(_) => ToolName::GetResourceUsage,
            ToolRequest::ListNamespaces => ToolName::ListNamespaces,
            ToolRequest::ListPods(_) => ToolName::ListPods,
            ToolRequest::DescribePod(_) => ToolName::DescribePod,
            ToolRequest::ListServices(_) => ToolName::ListServices,
            ToolRequest::ListDeployments(_) => ToolName::ListDeployments,
            ToolRequest::GetPodLogs(_) => ToolName::GetPodLogs,
            ToolRequest::ListHelmReleases(_) => ToolName::ListHelmReleases,
            ToolRequest::GetHelmRelease(_) => ToolName::GetHelmRelease,
            ToolRequest::GetHelmReleaseStatus(_) => ToolName::GetHelmReleaseStatus,
            ToolRequest::GetHelmReleaseHistory(_) => ToolName::GetHelmReleaseHistory,
            ToolRequest::Help(_) => ToolName::Help,
        }
    }
}
