use anyhow::{Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::store::{MemoryStore, MySqlStore, Store};

/// Opens the store named by `DATABASE_URL`.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        info!("Using in-memory store, data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let store = MySqlStore::new(pool);
    if config.run_migrations {
        store.migrate().await.context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    Ok(Arc::new(store))
}
