//! # Command Line Interface
//!
//! `eks-mcp` starts the stdio server by default. `eks-mcp tools` prints the tool
//! catalog as it is advertised to MCP clients.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::mcp::McpStdioServer;
use crate::observability::{init_logging, log_config_info};
use crate::session::{ConnectionGate, EksAuthenticator};
use crate::tools::{self, Dispatcher, ResponseOptions};

#[derive(Parser, Debug)]
#[command(name = "eks-mcp")]
#[command(about = "MCP server for EKS cluster and Helm release inspection")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level override
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Print the tool catalog as JSON and exit
    Tools,
}

impl Cli {
    /// Apply flag overrides on top of environment configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        } else if self.verbose {
            config.observability.log_level = "debug".to_string();
        }
        if self.json_logs {
            config.observability.json_logging = true;
        }
    }
}

/// Run the parsed command line against the loaded configuration
pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    cli.apply_overrides(&mut config);
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Tools => print_tools(),
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    init_logging(&config.observability)?;
    log_config_info(config);

    let authenticator = EksAuthenticator::new(&config.cluster, &config.helm);
    let dispatcher = Dispatcher::new(
        Arc::new(ConnectionGate::new()),
        Arc::new(authenticator),
        ResponseOptions::from(&config.response),
    );
    info!(tools = dispatcher.registry().len(), "Tool catalog loaded");

    let mut server = McpStdioServer::new(Arc::new(dispatcher));
    server.run().await?;
    Ok(())
}

fn print_tools() -> anyhow::Result<()> {
    let tools = tools::catalog().to_mcp_tools();
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["eks-mcp"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["eks-mcp", "tools"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Tools));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        let cli = Cli::try_parse_from(["eks-mcp", "serve", "--verbose", "--json-logs"]).unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logging);

        let cli = Cli::try_parse_from(["eks-mcp", "-v", "--log-level", "warn"]).unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_bad_log_level_rejected_at_run() {
        let cli = Cli::try_parse_from(["eks-mcp", "tools", "--log-level", "loud"]).unwrap();
        let result = tokio_test::block_on(run(cli, AppConfig::default()));
        assert!(result.is_err());
    }
}
