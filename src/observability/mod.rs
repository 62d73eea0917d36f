//! # Observability Infrastructure
//!
//! Structured logging for the eks-mcp server.

pub mod logging;

pub use logging::{build_env_filter, init_logging, log_config_info};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservabilityConfig;

    #[test]
    fn test_init_logging() {
        let config = ObservabilityConfig::default();

        let result = init_logging(&config);
        // May or may not install depending on whether a subscriber is already set
        assert!(result.is_ok());
    }
}
