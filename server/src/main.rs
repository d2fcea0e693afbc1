//! Model management REST service.
//!
//! Serves the class/definition model from a JSON seed file, accepts change-set
//! batches and deployments, and records them in a SQLite change log so they
//! survive restarts.
//!
//! Usage:
//!   modelmgmt-server --config modelmgmt.toml --port 8080

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use modelmgmt_engine::{ChangeLog, ManagerConfig, MemoryChangeLog, ModelManager};
use modelmgmt_server::{build_router, SeedProvider, ServerConfig};
use modelmgmt_storage::ChangeSetStore;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "modelmgmt-server")]
#[command(about = "Model management REST service")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "modelmgmt.toml")]
    config: PathBuf,

    /// Port to listen on, overriding the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = ServerConfig::load_from(&args.config);
    let addr = config
        .socket_addr(args.port)
        .with_context(|| format!("Invalid listen address {:?}", config.listen_addr))?;

    let change_log: Arc<dyn ChangeLog> = match &config.database_path {
        Some(path) => {
            info!("Using change log at {:?}", path);
            Arc::new(ChangeSetStore::open(path).context("Failed to open change log")?)
        }
        None => {
            warn!("No database_path configured, changes will not survive a restart");
            Arc::new(MemoryChangeLog::new())
        }
    };

    let provider = Arc::new(match &config.seed_path {
        Some(path) => SeedProvider::new(path),
        None => {
            warn!("No seed_path configured, starting with an empty model");
            SeedProvider::empty()
        }
    });

    let manager_config = ManagerConfig {
        persist_changes: config.persist_changes,
        ..ManagerConfig::default()
    };
    let manager = ModelManager::load(manager_config, provider.clone(), provider, change_log)
        .await
        .context("Failed to load models")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        version = manager.version(),
        deployed_version = manager.deployed_version(),
        "Model management listening on {}",
        addr
    );

    axum::serve(listener, build_router(Arc::new(manager)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Model management stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
