//! Common test utilities for all integration tests.
//!
//! Builds dispatchers over the in-memory collaborators from `eks_mcp::testing`.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use eks_mcp::session::ConnectionGate;
use eks_mcp::testing::{fixtures, MockAuthenticator, MockClusterApi, MockHelmClient};
use eks_mcp::tools::{Dispatcher, ResponseOptions, StructuredResponse};
use serde_json::json;
use std::sync::Arc;

pub const CLUSTER: &str = "prod";
pub const REGION: &str = "us-west-2";

pub fn dispatcher_with(auth: MockAuthenticator, options: ResponseOptions) -> Dispatcher {
    Dispatcher::new(Arc::new(ConnectionGate::new()), Arc::new(auth), options)
}

pub fn dispatcher(auth: MockAuthenticator) -> Dispatcher {
    dispatcher_with(auth, ResponseOptions::default())
}

/// A cluster with three namespaces, a couple of pods and one Helm release per status
pub fn populated_cluster() -> (Arc<MockClusterApi>, Arc<MockHelmClient>) {
    let cluster = MockClusterApi::with_namespaces(&["default", "kube-system", "apps"])
        .with_nodes(vec![fixtures::node("ip-10-0-1-1", true, "v1.29.0"), fixtures::node("ip-10-0-1-2", false, "v1.29.0")])
        .with_pods(vec![
            fixtures::pod("web-1", "default", "Running", true, 0),
            fixtures::pod("web-2", "default", "Pending", false, 0),
            fixtures::pod("coredns-1", "kube-system", "Running", true, 1),
        ])
        .with_logs("started\nready\n");
    let helm = MockHelmClient::new()
        .with_release(fixtures::release("web", "apps", "deployed"))
        .with_release(fixtures::release("jobs", "apps", "failed"));
    (Arc::new(cluster), Arc::new(helm))
}

/// Dispatcher already connected to `prod` in `us-west-2`
pub async fn connected() -> (Dispatcher, Arc<MockClusterApi>) {
    let (cluster, helm) = populated_cluster();
    let dispatcher = dispatcher(MockAuthenticator::with_clients(Arc::clone(&cluster), helm));
    let response = dispatcher.execute("connect_to_eks", json!({"clusterName": CLUSTER, "region": REGION})).await;
    assert!(response.success, "connect failed: {:?}", response.error);
    (dispatcher, cluster)
}

/// Exactly one of data/error is set on every envelope
pub fn assert_well_formed(response: &StructuredResponse) {
    assert_eq!(response.data.is_some(), response.success);
    assert_eq!(response.error.is_some(), !response.success);
    assert_eq!(response.error_kind.is_some(), !response.success);
    if !response.success {
        assert!(response.summary.is_none());
    }
}
