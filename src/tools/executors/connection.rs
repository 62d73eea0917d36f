use serde_json::{json, Value};
use tracing::instrument;

use crate::session::{Authenticator, ConnectRequest, ConnectionGate};
use crate::tools::args::ConnectArgs;
use crate::tools::dispatcher::DispatchError;

/// Execute connect_to_eks: authenticate, probe and publish a new session
#[instrument(skip(gate, authenticator, args), fields(cluster = %args.cluster_name, region = %args.region), name = "execute_connect")]
pub async fn connect(
    gate: &ConnectionGate,
    authenticator: &dyn Authenticator,
    args: ConnectArgs,
) -> Result<Value, DispatchError> {
    let session = gate
        .connect(authenticator, ConnectRequest::from(args))
        .await
        .map_err(|e| DispatchError::ExecutionFailed(e.to_string()))?;

    Ok(json!({
        "message": format!(
            "Successfully connected to EKS cluster: {} in region: {}",
            session.cluster_name, session.region
        ),
        "clusterName": session.cluster_name,
        "region": session.region,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthenticator, MockClusterApi};

    fn args() -> ConnectArgs {
        ConnectArgs { cluster_name: "prod".to_string(), region: "us-west-2".to_string(), role_arn: None }
    }

    #[tokio::test]
    async fn test_connect_reports_cluster() {
        let gate = ConnectionGate::new();
        let auth = MockAuthenticator::new(MockClusterApi::with_namespaces(&["default", "kube-system"]));

        let data = connect(&gate, &auth, args()).await.unwrap();
        assert_eq!(data["clusterName"], "prod");
        assert_eq!(data["region"], "us-west-2");
        assert!(data["message"].as_str().unwrap().contains("prod"));
        assert!(gate.is_connected());
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_message() {
        let gate = ConnectionGate::new();
        let auth = MockAuthenticator::rejecting("ExpiredToken");

        let err = connect(&gate, &auth, args()).await.unwrap_err();
        assert!(matches!(&err, DispatchError::ExecutionFailed(m) if m.contains("ExpiredToken")));
        assert!(!gate.is_connected());
    }
}
