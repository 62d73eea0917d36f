//! # Helm Releases
//!
//! Read-only release inspection behind the [`HelmClient`] trait. [`HelmCli`] is the
//! production implementation, driving the `helm` binary.

pub mod cli;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::utils::CommandError;

pub use cli::HelmCli;

#[derive(Debug, Error)]
pub enum HelmError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Failed to decode helm {what} output: {message}")]
    Decode { what: String, message: String },

    #[error("Invalid helm {what} '{value}'")]
    InvalidName { what: String, value: String },
}

impl HelmError {
    pub fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode { what: what.into(), message: err.to_string() }
    }
}

/// One row of `helm list --output json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSummary {
    pub name: String,
    pub namespace: String,
    #[serde(deserialize_with = "string_or_number")]
    pub revision: String,
    pub updated: String,
    pub status: String,
    pub chart: String,
    pub app_version: String,
}

/// `helm status --output json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseStatus {
    pub name: String,
    pub namespace: String,
    pub version: i64,
    pub info: ReleaseInfo,
    pub hooks: Vec<ReleaseHook>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseInfo {
    pub first_deployed: Option<String>,
    pub last_deployed: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    /// Rendered resources keyed by `apiVersion/Kind` (present with `--show-resources`)
    pub resources: Option<BTreeMap<String, Vec<Value>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseHook {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub events: Vec<String>,
}

impl ReleaseStatus {
    pub fn resource_count(&self) -> usize {
        self.info.resources.as_ref().map_or(0, |r| r.values().map(Vec::len).sum())
    }
}

/// One row of `helm history --output json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseRevision {
    pub revision: i64,
    pub updated: String,
    pub status: String,
    pub chart: String,
    pub app_version: String,
    pub description: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Release inspection operations. Each call runs against live cluster state.
#[async_trait]
pub trait HelmClient: Send + Sync {
    /// Releases in `namespace`, or in every namespace when `None`
    async fn list_releases(&self, namespace: Option<&str>) -> Result<Vec<ReleaseSummary>, HelmError>;

    async fn status(&self, release: &str, namespace: &str) -> Result<ReleaseStatus, HelmError>;

    /// User-supplied values; an empty object when none were set
    async fn values(&self, release: &str, namespace: &str) -> Result<Value, HelmError>;

    async fn manifest(&self, release: &str, namespace: &str) -> Result<String, HelmError>;

    async fn history(
        &self,
        release: &str,
        namespace: &str,
        max: i64,
    ) -> Result<Vec<ReleaseRevision>, HelmError>;
}
