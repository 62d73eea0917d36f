//! Structured response envelope
//!
//! Every tool call, success or failure, produces a [`StructuredResponse`]. Success
//! envelopes carry the tool's data plus an optional generated summary; error envelopes
//! carry a message and an [`ErrorKind`] and never a summary.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::session::ConnectionState;
use crate::tools::summary;

/// Message substituted for error details when [`ErrorHandling::Simple`] is configured
pub const SIMPLE_ERROR_MESSAGE: &str = "Operation failed";

/// Failure classification surfaced to callers as `errorKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownTool,
    NotConnected,
    InvalidArguments,
    ExecutionFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnknownTool => "UnknownTool",
            ErrorKind::NotConnected => "NotConnected",
            ErrorKind::InvalidArguments => "InvalidArguments",
            ErrorKind::ExecutionFailed => "ExecutionFailed",
        };
        f.write_str(s)
    }
}

/// Summary detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    /// Title, description and key metrics
    #[default]
    Concise,
    /// Concise plus recommendations
    Detailed,
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concise" => Ok(SummaryFormat::Concise),
            "detailed" => Ok(SummaryFormat::Detailed),
            other => Err(format!("expected 'concise' or 'detailed', got '{other}'")),
        }
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryFormat::Concise => f.write_str("concise"),
            SummaryFormat::Detailed => f.write_str("detailed"),
        }
    }
}

/// Error message verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Pass the underlying message through
    #[default]
    Detailed,
    /// Replace every message with [`SIMPLE_ERROR_MESSAGE`]
    Simple,
}

impl FromStr for ErrorHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detailed" => Ok(ErrorHandling::Detailed),
            "simple" => Ok(ErrorHandling::Simple),
            other => Err(format!("expected 'detailed' or 'simple', got '{other}'")),
        }
    }
}

impl fmt::Display for ErrorHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorHandling::Detailed => f.write_str("detailed"),
            ErrorHandling::Simple => f.write_str("simple"),
        }
    }
}

/// Response shaping policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOptions {
    pub include_summary: bool,
    pub include_metadata: bool,
    pub summary_format: SummaryFormat,
    pub error_handling: ErrorHandling,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_metadata: true,
            summary_format: SummaryFormat::Concise,
            error_handling: ErrorHandling::Detailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// RFC 3339 call time
    pub timestamp: String,
    pub tool_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ConnectionState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub title: String,
    pub description: String,
    pub key_metrics: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

/// The uniform tool response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl StructuredResponse {
    pub fn with_cluster_info(mut self, state: ConnectionState) -> Self {
        self.metadata.cluster_info = Some(state);
        self
    }

    pub fn with_execution_time(mut self, millis: u64) -> Self {
        self.metadata.execution_time_ms = Some(millis);
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.metadata.tool_name
    }
}

/// Builds envelopes under a fixed [`ResponseOptions`] policy
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    options: ResponseOptions,
}

impl EnvelopeBuilder {
    pub fn new(options: ResponseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResponseOptions {
        &self.options
    }

    pub fn build_success(&self, tool_name: &str, data: Value) -> StructuredResponse {
        let summary = self
            .options
            .include_summary
            .then(|| summary::summarize(tool_name, &data, self.options.summary_format));

        StructuredResponse {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            metadata: metadata(tool_name),
            summary,
        }
    }

    pub fn build_error(
        &self,
        tool_name: &str,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> StructuredResponse {
        let error = match self.options.error_handling {
            ErrorHandling::Detailed => message.into(),
            ErrorHandling::Simple => SIMPLE_ERROR_MESSAGE.to_string(),
        };

        StructuredResponse {
            success: false,
            data: None,
            error: Some(error),
            error_kind: Some(kind),
            metadata: metadata(tool_name),
            summary: None,
        }
    }
}

fn metadata(tool_name: &str) -> ResponseMetadata {
    ResponseMetadata {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        tool_name: tool_name.to_string(),
        execution_time_ms: None,
        cluster_info: None,
    }
}
