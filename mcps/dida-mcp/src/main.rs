//! Dida MCP - Dida365 / TickTick tasks over MCP stdio

use std::sync::Arc;

use clap::Parser;
use rmcp::{transport::io::stdio, ServiceExt};

use dida_mcp::auth::reconcile;
use dida_mcp::{
    ConfigStore, DeviceFingerprint, DidaClient, DidaMcpServer, ReqwestTransport, Session, Settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    mcp_common::init_tracing(&["dida_mcp", "mcp_common"])?;

    tracing::info!("Starting Dida MCP server");

    let store = ConfigStore::new(settings.resolved_config_path());
    let credentials = store.load_credentials();

    tracing::info!(
        configured = credentials.v1_token.is_some(),
        "v1 API token (OAuth)"
    );
    tracing::info!(configured = credentials.v2_token.is_some(), "v2 API token");
    if let Some(inbox_id) = &credentials.inbox_id {
        tracing::info!(inbox_id = %inbox_id, "using cached inbox id");
    }
    let has_token = credentials.has_any_token();

    let client = DidaClient::new(
        Arc::new(ReqwestTransport::new()?),
        settings.endpoints(),
        Arc::new(Session::new(credentials)),
        DeviceFingerprint::process(),
    )
    .with_time_zone(settings.time_zone.clone())
    .with_config_store(store);

    if settings.skip_auth {
        tracing::info!("skipping startup authentication");
    } else if has_token {
        match reconcile(&client).await {
            Ok(report) => tracing::info!(
                projects = report.projects,
                tags = report.tags,
                "startup authentication succeeded"
            ),
            Err(e) => tracing::warn!(error = %e, "startup authentication failed"),
        }
    } else {
        tracing::warn!("no API tokens configured; add them to the config file and run authenticate");
    }

    let server = DidaMcpServer::new(client);
    let service = server.serve(stdio()).await?;

    tracing::info!("Dida MCP server running");

    service.waiting().await?;

    tracing::info!("Dida MCP server stopped");

    Ok(())
}
