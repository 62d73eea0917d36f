//! # Configuration Management
//!
//! Environment-driven configuration for the eks-mcp server. Values are read from
//! `EKS_MCP_*` variables (a `.env` file is loaded first by the binary) and validated
//! before the server starts.

pub mod settings;

pub use settings::{
    AppConfig, ClusterConfig, HelmConfig, ObservabilityConfig, ResponseConfig, ENV_PREFIX,
};
