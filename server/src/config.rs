//! Server configuration.
//!
//! Loaded from a TOML file, with every section defaulted so a bare
//! `atelier-server` starts against a local SQLite database. The database
//! URL can always be overridden with `ATELIER_DATABASE_URL`.

use std::env;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the Atelier server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chunk buffer configuration.
    #[serde(default)]
    pub chunk_buffer: ChunkBufferConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://...` or `postgres://...`).
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout for acquiring a connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Chunk buffer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkBufferConfig {
    /// Buffered chunks older than this are considered abandoned and
    /// removed by the sweeper.
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,

    /// How often the sweeper runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://atelier.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_expiry_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            database: DatabaseConfig::default(),
            chunk_buffer: ChunkBufferConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for ChunkBufferConfig {
    fn default() -> Self {
        Self {
            expiry_secs: default_expiry_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, then applies environment
    /// overrides and validates.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from defaults and environment overrides
    /// alone, for running without a config file.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("ATELIER_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(listen) = env::var("ATELIER_LISTEN") {
            self.listen = listen;
        }
    }

    /// Validates all configuration fields.
    pub fn validate(&self) -> Result<()> {
        self.listen
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("Invalid listen address '{}': {}", self.listen, e))?;

        if self.database.url.is_empty() {
            return Err(anyhow!("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be positive"));
        }
        if self.chunk_buffer.expiry_secs == 0 {
            return Err(anyhow!("chunk_buffer.expiry_secs must be positive"));
        }
        if self.chunk_buffer.sweep_interval_secs == 0 {
            return Err(anyhow!("chunk_buffer.sweep_interval_secs must be positive"));
        }

        Ok(())
    }
}
