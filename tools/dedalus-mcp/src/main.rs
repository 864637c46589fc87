//! Dedalus MCP Server
//!
//! Serves the DillyDally tools over stdio (default) or HTTP (`--port`/`PORT`).

use anyhow::Context;
use clap::Parser;
use dedalus_client::{Backend, ConvexClient, Unconfigured};
use dedalus_mcp::protocol::MCP_PROTOCOL_VERSION;
use dedalus_mcp::transport::{self, HttpState, SessionStore, StdioTransport};
use dedalus_mcp::{builtin_registry, Config, HttpConfig, McpServer, ToolRegistry, TransportMode};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Log to stderr, stdout is for JSON-RPC
    let filter = match config.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(config).await {
        error!("❌ Fatal error running Dedalus MCP server: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("🚀 Starting Dedalus MCP Server v{}", env!("CARGO_PKG_VERSION"));
    info!("📡 Protocol: MCP {} over JSON-RPC 2.0", MCP_PROTOCOL_VERSION);

    let backend = backend(&config)?;
    let registry = Arc::new(builtin_registry(backend).context("failed to build tool registry")?);
    info!("🔧 {} tools registered", registry.len());

    match config.transport() {
        TransportMode::Stdio => run_stdio(registry).await,
        TransportMode::Http(http) => run_http(registry, http).await,
    }
}

fn backend(config: &Config) -> anyhow::Result<Arc<dyn Backend>> {
    let Some(url) = config.backend_url() else {
        warn!("⚠️  CONVEX_URL is not set; backend tools will report an error");
        return Ok(Arc::new(Unconfigured));
    };

    let mut client = ConvexClient::new(url).context("failed to create backend client")?;
    if let Some(token) = config.auth_token.as_deref() {
        client = client.with_auth_token(token);
    }
    info!("🗄️  Backend: {}", client.base_url());
    Ok(Arc::new(client))
}

async fn run_stdio(registry: Arc<ToolRegistry>) -> anyhow::Result<()> {
    info!("🔌 Transport: stdio (NDJSON)");

    transport::run_stdio(
        StdioTransport::stdio(),
        McpServer::new(registry),
        shutdown_signal(),
    )
    .await?;

    info!("👋 Dedalus MCP Server stopped");
    Ok(())
}

async fn run_http(registry: Arc<ToolRegistry>, http: HttpConfig) -> anyhow::Result<()> {
    info!("🔌 Transport: HTTP");

    let addr = http.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("✅ Dedalus MCP Server listening on http://{}", addr);

    let state = HttpState::new(registry, SessionStore::new());
    transport::serve(listener, state, http.session_idle_timeout, shutdown_signal()).await?;

    info!("👋 Dedalus MCP Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("❌ Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
