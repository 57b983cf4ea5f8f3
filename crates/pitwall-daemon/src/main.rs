//! # pitwall
//!
//! Telemetry server binary: loads settings, opens the store, seeds the
//! sensor catalog, and serves until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pitwall_core::SensorIdentity;
use pitwall_settings::{PitwallSettings, load_settings_from_path, settings_path};
use pitwall_server::{ServerConfig, TelemetryServer};
use pitwall_store::{ConnectionConfig, TelemetryStore, new_file_pool};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pitwall telemetry server.
#[derive(Parser, Debug)]
#[command(name = "pitwall", about = "Pitwall telemetry server")]
struct Cli {
    /// Path to the settings file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings, 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the SQLite database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Cli {
    /// Loaded settings with CLI overrides applied on top.
    fn settings(&self) -> pitwall_settings::Result<PitwallSettings> {
        let path = self.config.clone().unwrap_or_else(settings_path);
        let mut settings = load_settings_from_path(&path)?;
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(db_path) = &self.db_path {
            settings.storage.db_path = db_path.display().to_string();
        }
        Ok(settings)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// `PITWALL_LOG` wins over the settings log level when set.
fn init_logging(settings: &PitwallSettings) {
    let filter = EnvFilter::try_from_env("PITWALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.as_filter_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.settings().context("failed to load settings")?;
    init_logging(&settings);

    let db_path = PathBuf::from(&settings.storage.db_path);
    ensure_parent_dir(&db_path)?;
    let pool_config = ConnectionConfig {
        max_connections: settings.storage.max_connections,
        busy_timeout_ms: settings.storage.busy_timeout_ms,
        ..ConnectionConfig::default()
    };
    let pool = new_file_pool(&db_path, &pool_config)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    let store = TelemetryStore::new(pool).context("failed to initialize store")?;

    let catalog: Vec<SensorIdentity> = settings
        .catalog
        .iter()
        .map(pitwall_settings::CatalogEntry::identity)
        .collect();
    store.seed(&catalog).context("failed to seed sensor catalog")?;
    let sensors = store.sensor_count().context("failed to count sensors")?;
    info!(sensors, "catalog ready");

    let shutdown_grace = Duration::from_millis(settings.server.shutdown_grace_ms);
    let server = TelemetryServer::new(ServerConfig::from_settings(&settings), Arc::new(store));
    let addr = server.listen().await.context("failed to bind server")?;
    info!("pitwall listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    info!("shutting down");
    server.shutdown().graceful_shutdown(Some(shutdown_grace)).await;
    info!("shutdown complete");
    Ok(())
}
