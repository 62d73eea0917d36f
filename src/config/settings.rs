//! # Configuration Settings
//!
//! Defines the configuration structure for the eks-mcp server.

use crate::errors::{Error, Result};
use crate::tools::envelope::{ErrorHandling, ResponseOptions, SummaryFormat};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Prefix shared by every environment variable the server reads
pub const ENV_PREFIX: &str = "EKS_MCP_";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Response envelope configuration
    #[validate(nested)]
    pub response: ResponseConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Cluster access configuration
    #[validate(nested)]
    pub cluster: ClusterConfig,

    /// Helm client configuration
    #[validate(nested)]
    pub helm: HelmConfig,
}

impl AppConfig {
    /// Load configuration from `EKS_MCP_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `lookup` receives full variable names (e.g. `EKS_MCP_LOG_LEVEL`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let parsed = |name: &str| (name.to_string(), var(name));

        let response = &defaults.response;
        let config = Self {
            response: ResponseConfig {
                include_summary: parse_or(parsed("INCLUDE_SUMMARY"), response.include_summary)?,
                include_metadata: parse_or(parsed("INCLUDE_METADATA"), response.include_metadata)?,
                summary_format: parse_or(parsed("SUMMARY_FORMAT"), response.summary_format)?,
                error_handling: parse_or(parsed("ERROR_HANDLING"), response.error_handling)?,
            },
            observability: ObservabilityConfig {
                service_name: var("SERVICE_NAME")
                    .unwrap_or_else(|| defaults.observability.service_name.clone()),
                log_level: var("LOG_LEVEL")
                    .unwrap_or_else(|| defaults.observability.log_level.clone()),
                json_logging: parse_or(parsed("JSON_LOGS"), defaults.observability.json_logging)?,
            },
            cluster: ClusterConfig {
                aws_binary: var("AWS_BINARY")
                    .unwrap_or_else(|| defaults.cluster.aws_binary.clone()),
                request_timeout_seconds: parse_or(
                    parsed("REQUEST_TIMEOUT_SECONDS"),
                    defaults.cluster.request_timeout_seconds,
                )?,
                kubeconfig_path: var("KUBECONFIG").or_else(|| defaults.cluster.kubeconfig_path.clone()),
            },
            helm: HelmConfig {
                helm_binary: var("HELM_BINARY")
                    .unwrap_or_else(|| defaults.helm.helm_binary.clone()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        if self.observability.log_level.parse::<tracing::Level>().is_err() {
            return Err(Error::validation_field(
                format!("Unknown log level '{}'", self.observability.log_level),
                "log_level",
            ));
        }

        Ok(())
    }
}

fn parse_or<T>((name, raw): (String, Option<String>), default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("Invalid {ENV_PREFIX}{name} '{value}': {e}"))),
    }
}

/// Response envelope configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResponseConfig {
    /// Attach a generated summary to success envelopes
    pub include_summary: bool,

    /// Attach cluster connection info to envelope metadata
    pub include_metadata: bool,

    /// Summary detail level
    pub summary_format: SummaryFormat,

    /// Error message verbosity
    pub error_handling: ErrorHandling,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        let options = ResponseOptions::default();
        Self {
            include_summary: options.include_summary,
            include_metadata: options.include_metadata,
            summary_format: options.summary_format,
            error_handling: options.error_handling,
        }
    }
}

impl From<&ResponseConfig> for ResponseOptions {
    fn from(config: &ResponseConfig) -> Self {
        Self {
            include_summary: config.include_summary,
            include_metadata: config.include_metadata,
            summary_format: config.summary_format,
            error_handling: config.error_handling,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "eks-mcp".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

/// Cluster access configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterConfig {
    /// AWS CLI binary used for cluster discovery and token generation
    #[validate(length(min = 1, message = "AWS binary cannot be empty"))]
    pub aws_binary: String,

    /// Kubernetes API request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Request timeout must be between 1 and 300 seconds"))]
    pub request_timeout_seconds: u64,

    /// Kubeconfig file updated on connect (AWS CLI default when unset)
    pub kubeconfig_path: Option<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { aws_binary: "aws".to_string(), request_timeout_seconds: 30, kubeconfig_path: None }
    }
}

impl ClusterConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Helm client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HelmConfig {
    /// Helm binary
    #[validate(length(min = 1, message = "Helm binary cannot be empty"))]
    pub helm_binary: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self { helm_binary: "helm".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert!(config.response.include_summary);
        assert!(config.response.include_metadata);
        assert_eq!(config.response.summary_format, SummaryFormat::Concise);
        assert_eq!(config.response.error_handling, ErrorHandling::Detailed);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.cluster.aws_binary, "aws");
        assert_eq!(config.cluster.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.helm.helm_binary, "helm");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("EKS_MCP_INCLUDE_SUMMARY", "false"),
            ("EKS_MCP_SUMMARY_FORMAT", "detailed"),
            ("EKS_MCP_ERROR_HANDLING", "simple"),
            ("EKS_MCP_LOG_LEVEL", "debug"),
            ("EKS_MCP_JSON_LOGS", "true"),
            ("EKS_MCP_REQUEST_TIMEOUT_SECONDS", "5"),
            ("EKS_MCP_KUBECONFIG", "/tmp/kubeconfig"),
            ("EKS_MCP_HELM_BINARY", "/usr/local/bin/helm"),
        ]))
        .unwrap();

        assert!(!config.response.include_summary);
        assert_eq!(config.response.summary_format, SummaryFormat::Detailed);
        assert_eq!(config.response.error_handling, ErrorHandling::Simple);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logging);
        assert_eq!(config.cluster.request_timeout_seconds, 5);
        assert_eq!(config.cluster.kubeconfig_path.as_deref(), Some("/tmp/kubeconfig"));
        assert_eq!(config.helm.helm_binary, "/usr/local/bin/helm");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("EKS_MCP_INCLUDE_SUMMARY", "maybe")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result =
            AppConfig::from_lookup(lookup_from(&[("EKS_MCP_REQUEST_TIMEOUT_SECONDS", "0")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = AppConfig::from_lookup(lookup_from(&[("EKS_MCP_LOG_LEVEL", "chatty")]));
        assert!(matches!(result, Err(Error::Validation { field: Some(f), .. }) if f == "log_level"));
    }

    #[test]
    fn test_response_options_conversion() {
        let config = ResponseConfig {
            include_summary: false,
            include_metadata: false,
            summary_format: SummaryFormat::Detailed,
            error_handling: ErrorHandling::Simple,
        };
        let options = ResponseOptions::from(&config);
        assert!(!options.include_summary);
        assert!(!options.include_metadata);
        assert_eq!(options.summary_format, SummaryFormat::Detailed);
        assert_eq!(options.error_handling, ErrorHandling::Simple);
    }
}
