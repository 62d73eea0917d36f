//! Kubernetes REST client
//!
//! A thin bearer-token client over the core/v1 and apps/v1 read endpoints.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Certificate, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::cluster::types::{
    Deployment, Namespace, Node, ObjectList, Pod, PodLogRequest, Service,
};
use crate::cluster::{ClusterApi, ClusterError};

/// Connection parameters for one cluster
#[derive(Clone)]
pub struct KubeClientConfig {
    /// API server URL (e.g. `https://ABCD.gr7.us-west-2.eks.amazonaws.com`)
    pub endpoint: String,
    pub token: String,
    /// Base64-encoded PEM bundle as reported by `describe-cluster`
    pub certificate_authority: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for KubeClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("certificate_authority", &self.certificate_authority.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Kubernetes `Status` object returned on API errors
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct KubeRestClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl KubeRestClient {
    pub fn new(config: KubeClientConfig) -> Result<Self, ClusterError> {
        let base_url = Url::parse(&config.endpoint).map_err(|e| ClusterError::Endpoint {
            endpoint: config.endpoint.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClusterError::Endpoint {
                endpoint: config.endpoint,
                message: "not a base URL".to_string(),
            });
        }

        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(encoded) = config.certificate_authority.as_deref().filter(|s| !s.is_empty()) {
            let pem = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| ClusterError::decode("cluster certificate authority", e))?;
            let certificate = Certificate::from_pem(&pem)
                .map_err(|e| ClusterError::decode("cluster certificate authority", e))?;
            builder = builder.add_root_certificate(certificate);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url, token: config.token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments; names that would be read as dot-segments are rejected
    fn url(&self, segments: &[&str]) -> Result<Url, ClusterError> {
        if let Some(bad) = segments.iter().find(|s| !is_path_safe(s)) {
            return Err(ClusterError::InvalidName(bad.to_string()));
        }
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<Response, ClusterError> {
        debug!(url = %url, "GET");
        let response = self.client.get(url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiStatus>(&body)
            .ok()
            .map(|s| s.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body.trim().to_string()
                }
            });

        Err(ClusterError::Api { status: status.as_u16(), message })
    }

    async fn get_json<T: DeserializeOwned>(&self, what: &str, url: Url) -> Result<T, ClusterError> {
        let response = self.send(url).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClusterError::decode(what, e))
    }

    async fn list<T: DeserializeOwned>(&self, what: &str, segments: &[&str]) -> Result<Vec<T>, ClusterError> {
        let list: ObjectList<T> = self.get_json(what, self.url(segments)?).await?;
        Ok(list.items)
    }
}

fn is_path_safe(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..") && !segment.contains('/')
}

#[async_trait]
impl ClusterApi for KubeRestClient {
    #[instrument(skip(self))]
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        self.list("NamespaceList", &["api", "v1", "namespaces"]).await
    }

    #[instrument(skip(self))]
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        self.list("NodeList", &["api", "v1", "nodes"]).await
    }

    #[instrument(skip(self))]
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        match namespace {
            Some(ns) => self.list("PodList", &["api", "v1", "namespaces", ns, "pods"]).await,
            None => self.list("PodList", &["api", "v1", "pods"]).await,
        }
    }

    #[instrument(skip(self))]
    async fn read_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        let url = self.url(&["api", "v1", "namespaces", namespace, "pods", name])?;
        self.get_json("Pod", url).await
    }

    #[instrument(skip(self))]
    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        self.list("ServiceList", &["api", "v1", "namespaces", namespace, "services"]).await
    }

    #[instrument(skip(self))]
    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        self.list("DeploymentList", &["apis", "apps", "v1", "namespaces", namespace, "deployments"])
            .await
    }

    #[instrument(skip(self), fields(pod = %request.pod_name, namespace = %request.namespace))]
    async fn read_pod_log(&self, request: &PodLogRequest) -> Result<String, ClusterError> {
        let mut url = self.url(&[
            "api",
            "v1",
            "namespaces",
            request.namespace.as_str(),
            "pods",
            request.pod_name.as_str(),
            "log",
        ])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tailLines", &request.tail_lines.to_string());
            if let Some(container) = &request.container {
                query.append_pair("container", container);
            }
        }

        let response = self.send(url).await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> KubeRestClient {
        KubeRestClient::new(KubeClientConfig {
            endpoint: endpoint.to_string(),
            token: "t".to_string(),
            certificate_authority: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let c = client("https://example.com/proxy/");
        assert_eq!(
            c.url(&["api", "v1", "namespaces", "kube-system", "pods"]).unwrap().as_str(),
            "https://example.com/proxy/api/v1/namespaces/kube-system/pods"
        );

        let c = client("https://example.com");
        assert_eq!(c.url(&["api", "v1", "nodes"]).unwrap().as_str(), "https://example.com/api/v1/nodes");
    }

    #[test]
    fn test_dot_segments_and_slashes_rejected() {
        let c = client("https://example.com");
        for name in ["", ".", "..", "web/../log"] {
            let err = c.url(&["api", "v1", "namespaces", "default", "pods", name]).unwrap_err();
            assert!(matches!(err, ClusterError::InvalidName(ref n) if n == name), "{name:?}");
        }
        assert!(c.url(&["api", "v1", "namespaces", "default", "pods", "web-1.v2"]).is_ok());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = KubeRestClient::new(KubeClientConfig {
            endpoint: "not a url".to_string(),
            token: String::new(),
            certificate_authority: None,
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(result, Err(ClusterError::Endpoint { .. })));
    }

    #[test]
    fn test_invalid_certificate_rejected() {
        let result = KubeRestClient::new(KubeClientConfig {
            endpoint: "https://example.com".to_string(),
            token: String::new(),
            certificate_authority: Some("%%% not base64 %%%".to_string()),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(result, Err(ClusterError::Decode { .. })));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = KubeClientConfig {
            endpoint: "https://example.com".to_string(),
            token: "super-secret".to_string(),
            certificate_authority: None,
            timeout: Duration::from_secs(1),
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
