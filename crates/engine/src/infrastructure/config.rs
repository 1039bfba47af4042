//! Engine configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Where badges and progress are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown STORAGE_BACKEND '{other}', expected 'sqlite' or 'memory'"),
        }
    }
}

/// Engine configuration loaded from environment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,

    pub storage_backend: StorageBackend,
    /// SQLite database path (if using sqlite backend)
    pub badge_db_path: String,
    /// Write the default catalog when the catalog is empty
    pub seed_default_badges: bool,

    /// CORS allowed origins (comma-separated, or "*" for any); unset disables CORS
    pub cors_allowed_origins: Option<String>,

    /// Compare-and-swap attempts per progress update before giving up
    pub progress_max_retries: u32,
    /// Per-connection WebSocket outbound buffer
    pub ws_channel_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            storage_backend: StorageBackend::Sqlite,
            badge_db_path: "./data/badges.db".to_string(),
            seed_default_badges: true,
            cors_allowed_origins: None,
            progress_max_retries: 3,
            ws_channel_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SERVER_PORT must be a port number, got '{raw}'"))?,
            None => defaults.server_port,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.storage_backend,
        };

        let seed_default_badges = match lookup("SEED_DEFAULT_BADGES") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("SEED_DEFAULT_BADGES must be a boolean, got '{raw}'"))?,
            None => defaults.seed_default_badges,
        };

        let progress_max_retries = match lookup("PROGRESS_MAX_RETRIES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PROGRESS_MAX_RETRIES must be a number, got '{raw}'"))?,
            None => defaults.progress_max_retries,
        };
        if progress_max_retries == 0 {
            bail!("PROGRESS_MAX_RETRIES must be at least 1");
        }

        let ws_channel_buffer = match lookup("WS_CHANNEL_BUFFER") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("WS_CHANNEL_BUFFER must be a number, got '{raw}'"))?,
            None => defaults.ws_channel_buffer,
        };
        if ws_channel_buffer == 0 {
            bail!("WS_CHANNEL_BUFFER must be at least 1");
        }

        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            storage_backend,
            badge_db_path: lookup("BADGE_DB_PATH").unwrap_or(defaults.badge_db_path),
            seed_default_badges,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            progress_max_retries,
            ws_channel_buffer,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
