//! Crypto monitor binary - interactive menu over the tracking service

use anyhow::Result;
use crypto_monitor::{shell, AssetTracker, CoinGeckoProvider, Config, Database, SnapshotStore};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("crypto-monitor {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: db={}, currency={}",
        config.database_url, config.vs_currency
    );

    let database = Database::connect(&config.database_url).await?;
    let provider = Arc::new(CoinGeckoProvider::new()?);
    let tracker = AssetTracker::new(
        provider,
        SnapshotStore::new(&database),
        config.vs_currency.as_str(),
    );
    info!("Price provider: {}", tracker.provider_name());

    let result = shell::run(&tracker, &config).await;

    database.close().await;
    info!("Database connection closed");

    result?;
    Ok(())
}
