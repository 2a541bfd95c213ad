//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that open the
//! stores and wire them into the MCP tool handler.

use crate::config::AideConfig;
use crate::services::Services;
use crate::tools::AideTools;
use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::Arc;

/// Shared setup: create the data directory and open every store.
fn setup_shared_state(config: AideConfig) -> Result<Arc<Services>> {
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;

    let services = Services::open(config).context("failed to open stores")?;

    let health = services.check_health();
    if !health.is_healthy() {
        tracing::warn!(
            "some documents failed validation; tools will fall back to defaults. Run `aide doctor` for details"
        );
    }

    Ok(Arc::new(services))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: AideConfig) -> Result<()> {
    tracing::info!("starting aide MCP server on stdio");

    let services = setup_shared_state(config)?;

    let tools = AideTools::new(services);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: AideConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting aide MCP server on HTTP");

    let services = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(AideTools::new(services.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
