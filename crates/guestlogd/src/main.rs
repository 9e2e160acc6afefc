//! Guestlog Daemon - guest log agent

use anyhow::{Context, Result};
use guestlog_agent::GuestLogManager;
use guestlog_core::{constants, AgentConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod daemon;
mod handlers;

use daemon::Daemon;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guestlogd=info,guestlog_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Guestlog daemon starting...");

    let home = constants::guestlog_home();
    if !home.exists() {
        std::fs::create_dir_all(&home)?;
        info!("Created guestlog home directory: {}", home.display());
    }

    let config_path = std::env::var_os("GUESTLOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(constants::config_path);
    let config = AgentConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!(
        "Loaded config for manager '{}' ({} datastore logs)",
        config.manager,
        config.logs.len()
    );

    let socket_path = constants::socket_path();
    if socket_path.exists() {
        match tokio::net::UnixStream::connect(&socket_path).await {
            Ok(_) => {
                error!("Daemon is already running");
                std::process::exit(1);
            }
            Err(_) => {
                info!("Removing stale socket file");
                std::fs::remove_file(&socket_path)?;
            }
        }
    }

    let manager = GuestLogManager::from_config(&config)?;
    let daemon = Daemon::new(manager, &socket_path).await?;

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        result = daemon.run() => {
            if let Err(e) = result {
                error!("Daemon error: {}", e);
                return Err(e.into());
            }
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    info!("Daemon shutdown complete");
    Ok(())
}
