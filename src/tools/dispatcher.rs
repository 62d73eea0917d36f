//! # Tool Dispatcher
//!
//! Single entry point for tool calls. For every call the dispatcher:
//!
//! 1. looks up the descriptor (`UnknownTool`, no further checks),
//! 2. enforces the session precondition (`NotConnected`),
//! 3. validates arguments against the descriptor schema (`InvalidArguments`),
//! 4. runs the executor with the live handles,
//! 5. wraps the result, or the failure (`ExecutionFailed`), in an envelope.
//!
//! Failures never escape as `Err`: [`Dispatcher::execute`] always returns a
//! [`StructuredResponse`]. No retries are attempted.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

use crate::session::{ApiHandles, Authenticator, ConnectionGate};
use crate::tool_span;
use crate::tools::args::ToolRequest;
use crate::tools::catalog::ToolName;
use crate::tools::envelope::{EnvelopeBuilder, ErrorKind, ResponseOptions, StructuredResponse};
use crate::tools::executors;
use crate::tools::help::{self, LookupError};
use crate::tools::registry::{self, ToolRegistry};
use crate::tools::schema::ValidationError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Not connected to any EKS cluster. Please connect first using {}.", ToolName::ConnectToEks)]
    NotConnected,

    #[error(transparent)]
    InvalidArguments(#[from] ValidationError),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    LookupFailed(#[from] LookupError),
}

impl DispatchError {
    /// Envelope classification; help lookups surface as execution failures
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownTool(_) => ErrorKind::UnknownTool,
            DispatchError::NotConnected => ErrorKind::NotConnected,
            DispatchError::InvalidArguments(_) => ErrorKind::InvalidArguments,
            DispatchError::ExecutionFailed(_) | DispatchError::LookupFailed(_) => ErrorKind::ExecutionFailed,
        }
    }
}

pub struct Dispatcher {
    registry: &'static ToolRegistry,
    gate: Arc<ConnectionGate>,
    authenticator: Arc<dyn Authenticator>,
    envelopes: EnvelopeBuilder,
}

impl Dispatcher {
    /// Dispatcher over the built-in catalog
    pub fn new(
        gate: Arc<ConnectionGate>,
        authenticator: Arc<dyn Authenticator>,
        options: ResponseOptions,
    ) -> Self {
        Self { registry: registry::catalog(), gate, authenticator, envelopes: EnvelopeBuilder::new(options) }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry
    }

    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }

    pub fn options(&self) -> &ResponseOptions {
        self.envelopes.options()
    }

    /// Run one tool call and wrap the outcome in an envelope
    pub async fn execute(&self, tool_name: &str, raw_args: Value) -> StructuredResponse {
        let span = tool_span!(tool_name);
        async move {
            let started = Instant::now();
            let outcome = self.run(tool_name, &raw_args).await;
            let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let response = match outcome {
                Ok(data) => {
                    debug!(execution_time_ms = elapsed, "Tool call succeeded");
                    self.envelopes.build_success(tool_name, data)
                }
                Err(err) => {
                    let kind = err.kind();
                    warn!(error_kind = %kind, error = %err, execution_time_ms = elapsed, "Tool call failed");
                    self.envelopes.build_error(tool_name, kind, err.to_string())
                }
            }
            .with_execution_time(elapsed);

            if self.envelopes.options().include_metadata {
                response.with_cluster_info(self.gate.state())
            } else {
                response
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, tool_name: &str, raw_args: &Value) -> Result<Value, DispatchError> {
        let descriptor =
            self.registry.find_tool(tool_name).ok_or_else(|| DispatchError::UnknownTool(tool_name.to_string()))?;

        let handles = if descriptor.requires_session() {
            Some(self.gate.handles().ok_or(DispatchError::NotConnected)?)
        } else {
            None
        };

        let validated = descriptor.schema.validate(raw_args)?;
        let request = ToolRequest::from_validated(descriptor.name, validated)?;
        self.invoke(request, handles).await
    }

    async fn invoke(&self, request: ToolRequest, handles: Option<ApiHandles>) -> Result<Value, DispatchError> {
        let session = || handles.as_ref().ok_or(DispatchError::NotConnected);

        match request {
            ToolRequest::ConnectToEks(args) => {
                executors::connect(&self.gate, self.authenticator.as_ref(), args).await
            }
            ToolRequest::Help(args) => Ok(help::help(self.registry, &args)?),
            ToolRequest::GetClusterInfo => executors::cluster_info(session()?.cluster.as_ref()).await,
            ToolRequest::GetResourceUsage(args) => {
                executors::resource_usage(session()?.cluster.as_ref(), args).await
            }
            ToolRequest::ListNamespaces => executors::list_namespaces(session()?.cluster.as_ref()).await,
            ToolRequest::ListPods(args) => executors::list_pods(session()?.cluster.as_ref(), args).await,
            ToolRequest::DescribePod(args) => executors::describe_pod(session()?.cluster.as_ref(), args).await,
            ToolRequest::ListServices(args) => executors::list_services(session()?.cluster.as_ref(), args).await,
            ToolRequest::ListDeployments(args) => {
                executors::list_deployments(session()?.cluster.as_ref(), args).await
            }
            ToolRequest::GetPodLogs(args) => executors::pod_logs(session()?.cluster.as_ref(), args).await,
            ToolRequest::ListHelmReleases(args) => executors::list_releases(session()?.helm.as_ref(), args).await,
            ToolRequest::GetHelmRelease(args) => executors::get_release(session()?.helm.as_ref(), args).await,
            ToolRequest::GetHelmReleaseStatus(args) => {
                executors::release_status(session()?.helm.as_ref(), args).await
            }
            ToolRequest::GetHelmReleaseHistory(args) => {
                executors::release_history(session()?.helm.as_ref(), args).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthenticator, MockClusterApi};
    use serde_json::json;

    fn dispatcher(auth: MockAuthenticator) -> Dispatcher {
        Dispatcher::new(Arc::new(ConnectionGate::new()), Arc::new(auth), ResponseOptions::default())
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let d = dispatcher(MockAuthenticator::new(MockClusterApi::new()));
        let response = d.execute("does_not_exist", json!({"garbage": true})).await;
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::UnknownTool));
        assert_eq!(response.error.as_deref(), Some("Unknown tool: does_not_exist"));
    }

    #[tokio::test]
    async fn test_not_connected_checked_before_arguments() {
        let d = dispatcher(MockAuthenticator::new(MockClusterApi::new()));
        // describe_pod without its required podName still reports the missing session
        let response = d.execute("describe_pod", json!({})).await;
        assert_eq!(response.error_kind, Some(ErrorKind::NotConnected));
        assert!(response.error.unwrap().contains("connect_to_eks"));
    }

    #[tokio::test]
    async fn test_connect_validation_and_help_lookup() {
        let d = dispatcher(MockAuthenticator::new(MockClusterApi::with_namespaces(&["default"])));

        let response = d.execute("connect_to_eks", json!({"clusterName": "prod"})).await;
        assert_eq!(response.error_kind, Some(ErrorKind::InvalidArguments));
        assert_eq!(response.error.as_deref(), Some("Missing required field: region"));

        let response = d.execute("help", json!({"tool": "kubectl"})).await;
        assert_eq!(response.error_kind, Some(ErrorKind::ExecutionFailed));
        assert!(response.summary.is_none());
    }

    #[tokio::test]
    async fn test_metadata_attached() {
        let d = dispatcher(MockAuthenticator::new(MockClusterApi::with_namespaces(&["default"])));
        let response = d.execute("help", Value::Null).await;
        assert!(response.success);
        assert!(response.metadata.execution_time_ms.is_some());
        assert_eq!(response.metadata.cluster_info.as_ref().map(|c| c.connected), Some(false));

        d.execute("connect_to_eks", json!({"clusterName": "prod", "region": "us-west-2"})).await;
        let response = d.execute("list_namespaces", json!({})).await;
        assert!(response.success);
        assert_eq!(
            response.metadata.cluster_info.and_then(|c| c.cluster_name).as_deref(),
            Some("prod")
        );
    }

    #[tokio::test]
    async fn test_metadata_can_be_disabled() {
        let d = Dispatcher::new(
            Arc::new(ConnectionGate::new()),
            Arc::new(MockAuthenticator::new(MockClusterApi::new())),
            ResponseOptions { include_metadata: false, ..Default::default() },
        );
        let response = d.execute("help", json!({})).await;
        assert!(response.metadata.cluster_info.is_none());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failures_are_logged_with_kind() {
        let d = dispatcher(MockAuthenticator::new(MockClusterApi::new()));
        d.execute("list_pods", json!({})).await;
        assert!(logs_contain("Tool call failed"));
        assert!(logs_contain("error_kind=NotConnected"));
        assert!(logs_contain("tool=list_pods"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DispatchError::NotConnected.kind(), ErrorKind::NotConnected);
        assert_eq!(
            DispatchError::LookupFailed(LookupError::UnknownTool("x".to_string())).kind(),
            ErrorKind::ExecutionFailed
        );
        assert_eq!(
            DispatchError::from(ValidationError::Missing { field: "podName".to_string() }).kind(),
            ErrorKind::InvalidArguments
        );
    }
}
