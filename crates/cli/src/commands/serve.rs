//! `spacedock serve`: Start the HTTP gateway.

use spacedock_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🛰  Spacedock Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Remote:    {}", config.space_traders.base_url);

    spacedock_gateway::start(config).await?;

    Ok(())
}
