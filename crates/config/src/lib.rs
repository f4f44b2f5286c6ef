//! Configuration loading, validation, and management for Spacedock.
//!
//! Loads configuration from `~/.spacedock/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.spacedock/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local agent store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Remote SpaceTraders API
    #[serde(default)]
    pub space_traders: SpaceTradersConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database", &self.database)
            .field("space_traders", &self.space_traders)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; usually supplied via `DATABASE_URL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &redact(&self.url))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SpaceTradersConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent on every request; usually supplied via `AGENT_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Path of the server status endpoint, relative to `base_url`.
    #[serde(default = "default_status_path")]
    pub status_path: String,

    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,

    /// Faction used when a refresh registers an unknown agent.
    #[serde(default = "default_register_faction")]
    pub register_faction: String,

    /// Contact email sent with registrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_email: Option<String>,
}

fn default_base_url() -> String {
    "https://api.spacetraders.io/v2".into()
}
fn default_status_path() -> String {
    "/status".into()
}
fn default_remote_timeout() -> u64 {
    30
}
fn default_register_faction() -> String {
    "COSMIC".into()
}

impl Default for SpaceTradersConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            status_path: default_status_path(),
            timeout_secs: default_remote_timeout(),
            register_faction: default_register_faction(),
            register_email: None,
        }
    }
}

impl std::fmt::Debug for SpaceTradersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTradersConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("status_path", &self.status_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("register_faction", &self.register_faction)
            .field("register_email", &self.register_email)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Upper bound on total processing time of one request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_request_timeout() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.spacedock/config.toml).
    ///
    /// Environment variables override the file:
    /// - `DATABASE_URL`
    /// - `SPACE_TRADERS_BASE_URL`
    /// - `AGENT_TOKEN`
    /// - `SPACEDOCK_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(base_url) = lookup("SPACE_TRADERS_BASE_URL") {
            self.space_traders.base_url = base_url;
        }
        if let Some(token) = lookup("AGENT_TOKEN") {
            self.space_traders.token = Some(token);
        }
        if let Some(port) = lookup("SPACEDOCK_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("SPACEDOCK_PORT is not a valid port: {port}"))
            })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".spacedock")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.space_traders.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "space_traders.timeout_secs must be > 0".into(),
            ));
        }

        if self.gateway.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.request_timeout_secs must be > 0".into(),
            ));
        }

        if !self.space_traders.status_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "space_traders.status_path must start with '/'".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// The database URL, or an error naming the variable to set.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("database.url (or DATABASE_URL)".into()))
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required setting: {0}")]
    Missing(String),
}

impl From<ConfigError> for spacedock_core::Error {
    fn from(err: ConfigError) -> Self {
        spacedock_core::Error::Config {
            message: err.to_string(),
        }
    }
}
