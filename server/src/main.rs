//! Recall MCP Server Entry Point
//!
//! Supports two transports:
//! - stdio (default): newline-delimited JSON-RPC for MCP clients
//! - HTTP (--http): streamable HTTP with one request per POST /mcp

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recall_engine::Env;
use recall_mcp::config::{ServerConfig, Transport};
use recall_mcp::mcp::{http, McpServer};
use recall_mcp::service::MemoryService;

#[derive(Parser)]
#[command(name = "recall-mcp")]
#[command(about = "MCP server for long-term memory backed by the Recall engine")]
#[command(version)]
struct Args {
    /// Serve streamable HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// Serve stdio (default, kept for explicit configuration)
    #[arg(long)]
    stdio: bool,

    /// Bind host for the HTTP transport (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port for the HTTP transport (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logging goes to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recall_mcp=info,recall_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let env = Env::from_process();
    let mut config = ServerConfig::from_env(&env);

    if args.http {
        config.transport = Transport::Http;
    } else if args.stdio {
        config.transport = Transport::Stdio;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let service = Arc::new(MemoryService::new(env));

    tracing::info!(
        transport = ?config.transport,
        user = %service.default_user_id(),
        "starting Recall MCP server"
    );

    let server = Arc::new(McpServer::new(service));

    let result = match config.transport {
        Transport::Http => http::serve(Arc::clone(&server), &config.host, config.port).await,
        Transport::Stdio => server.run_stdio().await,
    };

    if let Err(e) = result {
        tracing::error!("MCP server error: {}", e);
        std::process::exit(1);
    }
}
