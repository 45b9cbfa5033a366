//!  Wander Places Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Unified MCP Server Entry Point
//!
//! Supports stdio and HTTP transports via subcommand.

use anyhow::{Context, Error, Result};
use clap::{Parser, Subcommand};
use rmcp::service::serve_server;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wander_places_agent::{ApiArgs, ApiConfig, PlacesAgentServer, Toolbox, router};

#[derive(Parser, Debug)]
#[command(name = "wander-places-mcp")]
#[command(
    author,
    version,
    about = "MCP server for places, geocoding and activity search"
)]
struct Args {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run MCP server over stdio (for Claude Desktop, etc.)
    Stdio,

    /// Run MCP server over HTTP (JSON-RPC on /mcp, REST on /api/*)
    Http {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value = "3000")]
        port: u16,
    },
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Ctrl+C received, shutting down");
        trigger.cancel();
    });
    token
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::debug!("Parsing arguments...");
    let args = Args::parse();
    tracing::debug!("Parsed args: {:?}", args);

    let config = ApiConfig::from(args.api);
    if config.foursquare_api_key.is_none() {
        tracing::warn!("FOURSQUARE_API_KEY is not set; place tools will fail");
    }
    if config.amadeus_api_key.is_none() || config.amadeus_api_secret.is_none() {
        tracing::warn!("AMADEUS_API_KEY / AMADEUS_API_SECRET not set; activity tools will fail");
    }

    tracing::debug!("Creating upstream clients...");
    let toolbox = Arc::new(Toolbox::new(&config).context("Failed to create upstream clients")?);
    tracing::debug!("Clients created");

    match args.command {
        Command::Stdio => {
            eprintln!("Starting MCP server over stdio...");
            let server = PlacesAgentServer::new(toolbox);
            let (stdin, stdout) = rmcp::transport::io::stdio();
            let running = serve_server(server, (stdin, stdout))
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
            tracing::debug!("Server running until stdin closes.");
            let reason = running.waiting().await.context("MCP service task failed")?;
            tracing::info!("MCP server stopped: {:?}", reason);
        }
        Command::Http { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .context("Invalid host:port")?;
            tracing::info!("Starting MCP server over HTTP on {}", addr);

            let server = PlacesAgentServer::new(Arc::clone(&toolbox));
            let session_manager = Arc::new(LocalSessionManager::default());
            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..Default::default()
            };
            let streaming =
                StreamableHttpService::new(move || Ok(server.clone()), session_manager, config);

            let app = router(toolbox).nest_service("/mcp/stream", streaming);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;

            tracing::info!("Health check: http://{}/health", addr);
            tracing::info!("MCP endpoint: http://{}/mcp", addr);
            tracing::info!("Streamable MCP endpoint: http://{}/mcp/stream", addr);
            tracing::info!("Places API: http://{}/api/search?near=Antalya&query=restaurant", addr);
            tracing::info!("Activities API: http://{}/api/activities?city=Istanbul&type=museum", addr);

            let shutdown = shutdown_on_ctrl_c();
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
                .context("HTTP server error")?;
        }
    }

    Ok(())
}
