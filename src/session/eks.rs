//! EKS authentication through the AWS CLI
//!
//! `connect_to_eks` resolves the cluster endpoint and CA with
//! `aws eks describe-cluster`, obtains a bearer token with `aws eks get-token` and
//! writes a kubeconfig context with `aws eks update-kubeconfig` so `helm` can reach
//! the same cluster. Credentials come from the standard AWS credential chain.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::cluster::{ClusterError, KubeClientConfig, KubeRestClient};
use crate::config::{ClusterConfig, HelmConfig};
use crate::helm::HelmCli;
use crate::session::authenticator::{ApiHandles, Authenticator, ConnectRequest};
use crate::utils::{command, CommandRunner};

/// `aws eks describe-cluster` output
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeClusterOutput {
    pub cluster: ClusterDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescription {
    pub name: String,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub certificate_authority: Option<CertificateAuthority>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateAuthority {
    #[serde(default)]
    pub data: Option<String>,
}

/// `aws eks get-token` output (an `ExecCredential`)
#[derive(Debug, Clone, Deserialize)]
struct ExecCredential {
    status: ExecCredentialStatus,
}

#[derive(Debug, Clone, Deserialize)]
struct ExecCredentialStatus {
    #[serde(default)]
    token: String,
}

pub fn parse_cluster_description(output: &str) -> Result<ClusterDescription, ClusterError> {
    let parsed: DescribeClusterOutput =
        serde_json::from_str(output).map_err(|e| ClusterError::decode("describe-cluster output", e))?;
    Ok(parsed.cluster)
}

pub fn parse_token(output: &str) -> Result<String, ClusterError> {
    let credential: ExecCredential =
        serde_json::from_str(output).map_err(|e| ClusterError::decode("get-token output", e))?;
    if credential.status.token.is_empty() {
        return Err(ClusterError::Auth("aws eks get-token returned an empty token".to_string()));
    }
    Ok(credential.status.token)
}

#[derive(Debug, Clone)]
pub struct EksAuthenticator {
    aws: CommandRunner,
    helm_binary: String,
    kubeconfig_path: Option<String>,
    timeout: Duration,
}

impl EksAuthenticator {
    pub fn new(cluster: &ClusterConfig, helm: &HelmConfig) -> Self {
        Self {
            aws: CommandRunner::new(&cluster.aws_binary, cluster.request_timeout()).env("AWS_PAGER", ""),
            helm_binary: helm.helm_binary.clone(),
            kubeconfig_path: cluster.kubeconfig_path.clone(),
            timeout: cluster.request_timeout(),
        }
    }

    fn eks_args(request: &ConnectRequest, subcommand: &str, name_flag: &str) -> Vec<String> {
        command::args(["eks", subcommand, name_flag, request.cluster_name.as_str(), "--region", request.region.as_str()])
    }

    fn push_role(args: &mut Vec<String>, request: &ConnectRequest) {
        if let Some(role_arn) = &request.role_arn {
            args.push("--role-arn".to_string());
            args.push(role_arn.clone());
        }
    }

    #[instrument(skip(self), fields(cluster = %request.cluster_name))]
    async fn describe_cluster(&self, request: &ConnectRequest) -> Result<ClusterDescription, ClusterError> {
        let mut args = Self::eks_args(request, "describe-cluster", "--name");
        args.extend(command::args(["--output", "json"]));
        let output = self.aws.run(&args).await?;
        parse_cluster_description(&output)
    }

    #[instrument(skip(self), fields(cluster = %request.cluster_name))]
    async fn get_token(&self, request: &ConnectRequest) -> Result<String, ClusterError> {
        let mut args = Self::eks_args(request, "get-token", "--cluster-name");
        Self::push_role(&mut args, request);
        args.extend(command::args(["--output", "json"]));
        let output = self.aws.run(&args).await?;
        parse_token(&output)
    }

    #[instrument(skip(self), fields(cluster = %request.cluster_name))]
    async fn update_kubeconfig(&self, request: &ConnectRequest) -> Result<(), ClusterError> {
        let mut args = Self::eks_args(request, "update-kubeconfig", "--name");
        Self::push_role(&mut args, request);
        if let Some(path) = &self.kubeconfig_path {
            args.push("--kubeconfig".to_string());
            args.push(path.clone());
        }
        self.aws.run(&args).await?;
        Ok(())
    }
}

#[async_trait]
impl Authenticator for EksAuthenticator {
    async fn authenticate(&self, request: &ConnectRequest) -> Result<ApiHandles, ClusterError> {
        info!(cluster = %request.cluster_name, region = %request.region, "Authenticating to EKS cluster");

        let description = self.describe_cluster(request).await?;
        let endpoint = description
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ClusterError::Auth(format!("Cluster {} has no API endpoint", description.name)))?;

        match description.status.as_deref() {
            Some("ACTIVE") | None => {}
            Some(status) => warn!(cluster = %description.name, status, "Cluster is not ACTIVE"),
        }

        let token = self.get_token(request).await?;
        self.update_kubeconfig(request).await?;

        let cluster = KubeRestClient::new(KubeClientConfig {
            endpoint,
            token,
            certificate_authority: description.certificate_authority.and_then(|ca| ca.data),
            timeout: self.timeout,
        })?;

        // update-kubeconfig names the context after the cluster ARN
        let mut helm = HelmCli::new(&self.helm_binary, self.timeout);
        if let Some(arn) = description.arn {
            helm = helm.with_context(arn);
        }
        if let Some(path) = &self.kubeconfig_path {
            helm = helm.with_kubeconfig(path);
        }

        info!(
            cluster = %description.name,
            version = description.version.as_deref().unwrap_or("unknown"),
            "Obtained cluster credentials"
        );
        Ok(ApiHandles::new(Arc::new(cluster), Arc::new(helm)))
    }
}
