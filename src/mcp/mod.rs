//! # Model Context Protocol
//!
//! JSON-RPC 2.0 over line-delimited stdio. The handler answers the protocol
//! methods itself and hands `tools/call` to the tool dispatcher.

pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

pub use error::McpError;
pub use handler::{negotiate_version, McpHandler};
pub use protocol::{JsonRpcId, JsonRpcRequest, JsonRpcResponse, Tool, SUPPORTED_VERSIONS};
pub use server::McpStdioServer;
