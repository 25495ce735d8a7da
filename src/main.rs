//! Parallel Search MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server exposing the Parallel Search API as
//! the `parallel_search` tool, over streamable HTTP or stdio.

use std::time::Duration;

use clap::{Parser, Subcommand};

use parallel_search_mcp::config::Config;
use parallel_search_mcp::error::Result;
use parallel_search_mcp::mcp::http;
use parallel_search_mcp::mcp::server::McpServer;
use parallel_search_mcp::mcp::tools::ToolHandler;
use parallel_search_mcp::parallel::client::ParallelClient;

/// Parallel Search MCP Server
#[derive(Parser)]
#[command(name = "parallel-search-mcp")]
#[command(author, version, about = "Parallel Search MCP Server - web search for AI agents via MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Outbound search request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over streamable HTTP (default)
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Serve MCP over stdin/stdout
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    match cli.command {
        Some(Commands::Stdio) => {
            config.validate()?;
            let server = build_server(&config)?;
            server.run_stdio().await?;
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            config.validate()?;
            run_http(&config).await?;
        }
        None => {
            config.validate()?;
            run_http(&config).await?;
        }
    }

    Ok(())
}

fn build_server(config: &Config) -> Result<McpServer> {
    if config.api_key.is_none() {
        tracing::info!(
            "PARALLEL_API_KEY not set; callers must supply a key per call or via the x-api-key header"
        );
    }

    let client = ParallelClient::from_config(config)?;
    tracing::info!(
        endpoint = client.api_url(),
        timeout_secs = config.request_timeout.as_secs(),
        "Parallel Search client ready"
    );

    Ok(McpServer::new(ToolHandler::new(client, config.api_key.clone())))
}

async fn run_http(config: &Config) -> Result<()> {
    let server = build_server(config)?;
    http::serve(&config.bind_address(), server).await
}
