//! MCP Stdio Server
//!
//! Implements the stdio transport for MCP: reads line-delimited JSON-RPC messages
//! from stdin and writes responses to stdout, one request at a time.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::mcp::error::McpError;
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::tools::Dispatcher;

pub struct McpStdioServer {
    handler: McpHandler,
}

impl McpStdioServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { handler: McpHandler::new(dispatcher) }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&mut self) -> Result<(), McpError> {
        info!("Starting MCP stdio server");
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await?;
        info!("MCP stdio server shutting down (EOF received)");
        Ok(())
    }

    /// Serve any line-oriented reader/writer pair until the reader is exhausted
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!(bytes = line.len(), "Received input line");

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!(error = %e, "Failed to parse JSON-RPC request");
                    let response =
                        JsonRpcResponse::failure(None, McpError::ParseError(e.to_string()).into());
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handler.handle_request(request).await {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), McpError>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_string(response)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
