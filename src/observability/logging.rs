//! # Structured Logging
//!
//! Installs the global `tracing` subscriber and provides span helpers.
//!
//! Logs always go to stderr: stdout carries the MCP protocol stream and must only
//! ever contain JSON-RPC messages.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Create a tracing span for a single tool invocation.
///
/// ```rust,ignore
/// let span = tool_span!("list_pods");
/// let span = tool_span!("get_pod_logs", pod = "web-1");
/// ```
#[macro_export]
macro_rules! tool_span {
    ($tool:expr) => {
        tracing::info_span!(
            "tool_call",
            tool = %$tool,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($tool:expr, $($field:tt)*) => {
        tracing::info_span!(
            "tool_call",
            tool = %$tool,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the env filter: `RUST_LOG` wins over the configured level.
pub fn build_env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e))),
    }
}

/// Initialize the global subscriber.
///
/// Returns `Ok(false)` if a subscriber was already installed (e.g. by a test harness).
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = build_env_filter(config)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json_logging {
        builder.json().try_init().is_ok()
    } else {
        builder.with_ansi(false).try_init().is_ok()
    };

    if installed {
        tracing::info!(
            service_name = %config.service_name,
            log_level = %config.log_level,
            json_logging = config.json_logging,
            "Logging initialized"
        );
    }

    Ok(installed)
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        include_summary = config.response.include_summary,
        summary_format = %config.response.summary_format,
        error_handling = %config.response.error_handling,
        aws_binary = %config.cluster.aws_binary,
        helm_binary = %config.helm.helm_binary,
        request_timeout_seconds = config.cluster.request_timeout_seconds,
        "eks-mcp configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = tool_span!("list_pods");
        let _span = tool_span!("get_pod_logs", pod = "web-1");
    }

    #[test]
    fn test_build_env_filter_from_level() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let config = ObservabilityConfig { log_level: level.to_string(), ..Default::default() };
            assert!(build_env_filter(&config).is_ok());
        }
    }

    #[test]
    fn test_log_config_info() {
        let config = crate::config::AppConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
