//! `helm` binary driver

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::instrument;

use crate::helm::{HelmClient, HelmError, ReleaseRevision, ReleaseStatus, ReleaseSummary};
use crate::utils::CommandRunner;

#[derive(Debug, Clone)]
pub struct HelmCli {
    runner: CommandRunner,
    kubeconfig: Option<String>,
    kube_context: Option<String>,
}

impl HelmCli {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self { runner: CommandRunner::new(binary, timeout), kubeconfig: None, kube_context: None }
    }

    /// Use a specific kubeconfig file instead of helm's default
    pub fn with_kubeconfig(mut self, path: impl Into<String>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// Pin every command to one kubeconfig context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.kube_context = Some(context.into());
        self
    }

    fn command(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        if let Some(path) = &self.kubeconfig {
            full.push("--kubeconfig".to_string());
            full.push(path.clone());
        }
        if let Some(context) = &self.kube_context {
            full.push("--kube-context".to_string());
            full.push(context.clone());
        }
        full
    }

    async fn run(&self, args: &[&str]) -> Result<String, HelmError> {
        Ok(self.runner.run(&self.command(args)).await?)
    }

    async fn run_json<T: DeserializeOwned>(&self, what: &str, args: &[&str]) -> Result<T, HelmError> {
        let output = self.run(args).await?;
        let trimmed = output.trim();
        // `helm list`/`history` print nothing at all for an empty result on some versions
        let body = if trimmed.is_empty() { "null" } else { trimmed };
        serde_json::from_str(body).map_err(|e| HelmError::decode(what, e))
    }
}

/// Positional values must not be readable as flags
fn positional<'a>(what: &str, value: &'a str) -> Result<&'a str, HelmError> {
    if value.is_empty() || value.starts_with('-') {
        return Err(HelmError::InvalidName { what: what.to_string(), value: value.to_string() });
    }
    Ok(value)
}

#[async_trait]
impl HelmClient for HelmCli {
    #[instrument(skip(self))]
    async fn list_releases(&self, namespace: Option<&str>) -> Result<Vec<ReleaseSummary>, HelmError> {
        let mut args = vec!["list", "--all", "--output", "json"];
        match namespace {
            Some(ns) => args.extend(["--namespace", positional("namespace", ns)?]),
            None => args.push("--all-namespaces"),
        }
        let rows: Option<Vec<ReleaseSummary>> = self.run_json("list", &args).await?;
        Ok(rows.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn status(&self, release: &str, namespace: &str) -> Result<ReleaseStatus, HelmError> {
        let (release, namespace) = (positional("release", release)?, positional("namespace", namespace)?);
        self.run_json(
            "status",
            &["status", release, "--namespace", namespace, "--show-resources", "--output", "json"],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn values(&self, release: &str, namespace: &str) -> Result<Value, HelmError> {
        let (release, namespace) = (positional("release", release)?, positional("namespace", namespace)?);
        let values: Value = self
            .run_json("values", &["get", "values", release, "--namespace", namespace, "--output", "json"])
            .await?;
        Ok(match values {
            Value::Null => Value::Object(Map::new()),
            other => other,
        })
    }

    #[instrument(skip(self))]
    async fn manifest(&self, release: &str, namespace: &str) -> Result<String, HelmError> {
        let (release, namespace) = (positional("release", release)?, positional("namespace", namespace)?);
        self.run(&["get", "manifest", release, "--namespace", namespace]).await
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        release: &str,
        namespace: &str,
        max: i64,
    ) -> Result<Vec<ReleaseRevision>, HelmError> {
        let (release, namespace) = (positional("release", release)?, positional("namespace", namespace)?);
        let max = max.to_string();
        let rows: Option<Vec<ReleaseRevision>> = self
            .run_json(
                "history",
                &["history", release, "--namespace", namespace, "--max", max.as_str(), "--output", "json"],
            )
            .await?;
        Ok(rows.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_appended() {
        let cli = HelmCli::new("helm", Duration::from_secs(5))
            .with_kubeconfig("/tmp/kubeconfig")
            .with_context("arn:aws:eks:us-west-2:123:cluster/prod");
        assert_eq!(
            cli.command(&["list", "--output", "json"]),
            vec![
                "list",
                "--output",
                "json",
                "--kubeconfig",
                "/tmp/kubeconfig",
                "--kube-context",
                "arn:aws:eks:us-west-2:123:cluster/prod"
            ]
        );
    }

    #[tokio::test]
    async fn test_flag_like_names_rejected_before_spawn() {
        let cli = HelmCli::new("/nonexistent/helm", Duration::from_secs(5));

        let err = cli.status("--all-namespaces", "apps").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid helm release '--all-namespaces'");

        let err = cli.history("web", "-n", 5).await.unwrap_err();
        assert!(matches!(err, HelmError::InvalidName { ref what, .. } if what == "namespace"));

        assert!(matches!(cli.values("", "apps").await, Err(HelmError::InvalidName { .. })));
        assert!(matches!(cli.list_releases(Some("--debug")).await, Err(HelmError::InvalidName { .. })));

        // a well-formed name gets as far as spawning the missing binary
        assert!(matches!(cli.manifest("web", "apps").await, Err(HelmError::Command(_))));
    }

    #[test]
    fn test_no_global_flags_by_default() {
        let cli = HelmCli::new("helm", Duration::from_secs(5));
        assert_eq!(cli.command(&["version"]), vec!["version"]);
    }
}
