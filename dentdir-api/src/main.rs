//! dentdir-api - read API for best-dentists city pages
//!
//! Serves materialized pages and city listings from a read-only connection.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dentdir_api::db::connect_readonly;
use dentdir_api::{build_router, AppState};
use dentdir_common::config::{resolve_database_path, TomlConfig};
use dentdir_common::SystemClock;

/// Default listen address when neither CLI, environment nor config set one
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";

/// Command-line arguments for dentdir-api
#[derive(Parser, Debug)]
#[command(name = "dentdir-api")]
#[command(about = "Read API for best-dentists city pages")]
#[command(version)]
struct Args {
    /// SQLite database written by dentdir-materialize
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "DENTDIR_BIND")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml = TomlConfig::discover();

    let default_filter = toml
        .log_level
        .clone()
        .unwrap_or_else(|| "dentdir_api=info,tower_http=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting dentdir-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = resolve_database_path(args.database.as_deref(), &toml);
    info!("Database path: {}", db_path.display());
    let pool = connect_readonly(&db_path).await?;

    let addr = match args.bind {
        Some(addr) => addr,
        None => toml
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .context("Invalid bind address in config")?,
    };

    let app = build_router(AppState::new(pool, Arc::new(SystemClock)));

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
