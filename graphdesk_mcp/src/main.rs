use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use graphdesk_core::{
    context::AppContext,
    credentials::{self, MissingCredentialPolicy},
    mcp_server::{JsonRpcHandler, McpServer},
    tools,
    transport::StdioTransport,
    CredentialKind,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting graphdesk MCP server");

    let policy = if credentials::demo_fallback_enabled() {
        MissingCredentialPolicy::DemoFallback
    } else {
        MissingCredentialPolicy::Strict
    };
    let credentials = match credentials::resolve(policy) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Fatal configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(AppContext::new(&credentials));
    if ctx.kind == CredentialKind::Demo {
        info!("Demo credentials detected; Graph-backed tools will answer with an authentication notice");
    }
    ctx.log.append("info", "server starting");

    let registry = tools::build_registry();
    info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry, Arc::clone(&ctx));
    let handler = JsonRpcHandler::new(server);
    let transport = StdioTransport::new(handler);

    info!("MCP server ready, listening on stdio");

    if let Err(e) = transport.run().await {
        error!("Transport error: {}", e);
        return Err(e.into());
    }

    ctx.log.append("info", "server shutting down");
    Ok(())
}
