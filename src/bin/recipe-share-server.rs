// ABOUTME: RecipeShare HTTP server binary
// ABOUTME: Loads configuration, connects the data client and serves the web pages until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # RecipeShare Server Binary
//!
//! Starts the server-rendered RecipeShare site against the configured data
//! backend (`RECIPE_BACKEND=hosted` or `local`).

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use recipe_share::{
    config::ServerConfig,
    data_client, logging,
    routes::{self, AppResources},
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "recipe-share-server")]
#[command(about = "RecipeShare - share, browse and save recipes")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override listen host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let client = data_client::connect(&config.backend, &config.http_client).await?;
    let resources = Arc::new(AppResources::new(client, &config)?);
    let app = routes::router(resources);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("RecipeShare listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("RecipeShare stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
