use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use numbers::api::{shutdown_signal, start_server, AppState};
use numbers::config::Config;
use numbers::contracts::NumberStore;
use numbers::storage::RocksDbNumberStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("numbers=info".parse()?))
        .init();

    tracing::info!("Numbers service starting...");

    let config = Config::from_env()?;

    // Startup failures are fatal: never serve against a half-initialized store.
    std::fs::create_dir_all(&config.database_url)?;
    let store = RocksDbNumberStore::open(&config.database_url)?;
    tracing::info!("Opened RocksDB at {}", store.path().display());

    store.ensure_schema()?;
    tracing::info!("Numbers relation ready");

    let state = Arc::new(AppState::new(Arc::new(store)));

    start_server(config.server, state, shutdown_signal()).await?;

    Ok(())
}
