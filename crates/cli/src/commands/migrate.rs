//! `spacedock migrate`: Apply the agent schema.

use spacedock_config::AppConfig;
use spacedock_store::PostgresStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🗄  Applying agent schema...");

    let store = PostgresStore::connect(config.database_url()?, config.database.max_connections)
        .await
        .map_err(|e| format!("Failed to connect to database: {e}"))?;
    store.migrate().await?;
    store.close().await;

    println!("   ✅ Table spacetraders_agent is up to date");

    Ok(())
}
