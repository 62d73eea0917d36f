//! # eks-mcp
//!
//! A Model Context Protocol server exposing read-only inspection of Amazon EKS
//! clusters and the Helm releases installed in them.
//!
//! ## Architecture
//!
//! ```text
//! stdin → McpStdioServer → McpHandler → Dispatcher → executors → ClusterApi / HelmClient
//!                                          ↓
//!                                   ConnectionGate (session)
//! ```
//!
//! ## Core Components
//!
//! - **MCP layer** ([`mcp`]): JSON-RPC framing, method routing, stdio transport
//! - **Tools** ([`tools`]): catalog, schema validation, dispatch, response envelopes
//! - **Session** ([`session`]): the single active cluster connection
//! - **Collaborators** ([`cluster`], [`helm`]): Kubernetes REST access and the Helm CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eks_mcp::config::AppConfig;
//! use eks_mcp::mcp::McpStdioServer;
//! use eks_mcp::session::{ConnectionGate, EksAuthenticator};
//! use eks_mcp::tools::{Dispatcher, ResponseOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let authenticator = EksAuthenticator::new(&config.cluster, &config.helm);
//!     let dispatcher = Dispatcher::new(
//!         Arc::new(ConnectionGate::new()),
//!         Arc::new(authenticator),
//!         ResponseOptions::from(&config.response),
//!     );
//!     McpStdioServer::new(Arc::new(dispatcher)).run().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod errors;
pub mod helm;
pub mod mcp;
pub mod observability;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;
pub mod utils;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
