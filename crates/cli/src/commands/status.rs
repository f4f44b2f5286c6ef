//! `spacedock status`: Show the effective configuration.

use spacedock_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🛰  Spacedock Status");
    println!("===================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Database:       {}", if config.database.url.is_some() { "configured" } else { "not set" });
    println!("  Max conns:      {}", config.database.max_connections);
    println!("  Remote:         {}", config.space_traders.base_url);
    println!("  Status path:    {}", config.space_traders.status_path);
    println!("  Agent token:    {}", if config.space_traders.token.is_some() { "set" } else { "not set" });
    println!("  Remote timeout: {}s", config.space_traders.timeout_secs);
    println!("  Register as:    {}", config.space_traders.register_faction);
    println!("  Gateway:        {}:{}", config.gateway.host, config.gateway.port);
    println!("  Req. timeout:   {}s", config.gateway.request_timeout_secs);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, using defaults and environment");
    }

    Ok(())
}
