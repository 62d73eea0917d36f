use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cluster::{ClusterApi, ClusterError};
use crate::helm::HelmClient;

/// Parameters of a connect call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub cluster_name: String,
    pub region: String,
    pub role_arn: Option<String>,
}

impl ConnectRequest {
    pub fn new(cluster_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self { cluster_name: cluster_name.into(), region: region.into(), role_arn: None }
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }
}

/// Live clients bound to one authenticated cluster
#[derive(Clone)]
pub struct ApiHandles {
    pub cluster: Arc<dyn ClusterApi>,
    pub helm: Arc<dyn HelmClient>,
}

impl ApiHandles {
    pub fn new(cluster: Arc<dyn ClusterApi>, helm: Arc<dyn HelmClient>) -> Self {
        Self { cluster, helm }
    }
}

impl fmt::Debug for ApiHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiHandles").finish_non_exhaustive()
    }
}

/// Turns a connect request into live API handles
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &ConnectRequest) -> Result<ApiHandles, ClusterError>;

    /// Liveness probe run before a session is published
    async fn test_connection(&self, handles: &ApiHandles) -> bool {
        match handles.cluster.list_namespaces().await {
            Ok(namespaces) => {
                debug!(namespaces = namespaces.len(), "Connection test succeeded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                false
            }
        }
    }
}
