//! parking-ledger - vehicle visit ledger service
//!
//! Opens (or creates) the ledger database under the resolved root folder,
//! then serves the JSON API and spreadsheet exports.

use anyhow::{Context, Result};
use clap::Parser;
use parking_common::config::{ensure_root_folder, CliOverrides, ServiceConfig, TomlConfig};
use parking_common::db::init::init_database;
use parking_ledger::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for parking-ledger
#[derive(Parser, Debug)]
#[command(name = "parking-ledger")]
#[command(about = "Parking facility visit ledger")]
#[command(version)]
struct Args {
    /// Folder holding parking.db (also PARKING_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PARKING_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "PARKING_BIND")]
    bind: Option<String>,

    /// Shared API password; empty disables the gate
    #[arg(long, env = "PARKING_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Explicit config file instead of the platform default
    #[arg(short, long, env = "PARKING_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "parking_ledger=info,parking_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting parking-ledger v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => TomlConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => TomlConfig::load_or_default(),
    };

    let config = ServiceConfig::resolve(
        CliOverrides {
            root_folder: args.root_folder,
            port: args.port,
            bind: args.bind,
            password: args.password,
        },
        file_config,
    );

    ensure_root_folder(&config.root_folder).context("Failed to create root folder")?;
    info!("Database path: {}", config.db_path.display());

    let pool = match init_database(&config.db_path).await {
        Ok(pool) => {
            info!("Connected to ledger database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    if config.password.is_empty() {
        info!("API password gate disabled (no password configured)");
    } else {
        info!("API password gate enabled");
    }

    let state = AppState::new(pool.clone(), config.password.clone());
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("parking-ledger listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
