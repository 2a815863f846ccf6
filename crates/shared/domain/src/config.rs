use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level deployment profile shared across services.
///
/// One profile is selected by environment name at bootstrap and applied to
/// the application before any handle is created.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
}

/// Thin Arc-wrapped profile for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl AppConfig {
    /// Built-in development profile: verbose logging, local services.
    #[must_use]
    pub fn development() -> Self {
        let mut cfg = Self::default();
        cfg.logging.level = "debug".to_owned();
        cfg
    }

    /// Built-in production profile: info-level logging, JSON log files.
    #[must_use]
    pub fn production() -> Self {
        let mut cfg = Self::default();
        cfg.logging.level = "info".to_owned();
        cfg.logging.json = true;
        cfg
    }
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

/// Logging configuration: level plus the bounds of the rotating log files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit (`trace`..`error`).
    pub level: String,
    /// Directory the rotating log files are written into.
    pub directory: PathBuf,
    /// Hard cap on the size of each log file, in bytes.
    pub max_file_bytes: u64,
    /// Maximum number of rotated files retained.
    pub max_files: usize,
    /// Emit the file layer as JSON records.
    pub json: bool,
}

/// MySQL connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Redis cache-store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: u8,
    pub key_prefix: String,
}

/// Server-side session configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Session lifetime in seconds.
    pub ttl_seconds: u64,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: PathBuf::from("logs"),
            max_file_bytes: 100 * 1024 * 1024,
            max_files: 10,
            json: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mysql://root@127.0.0.1:3306/pressroom".to_owned(),
            max_connections: 10,
            acquire_timeout_seconds: 5,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 6379,
            db: 0,
            key_prefix: "pressroom".to_owned(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { cookie_name: "session_id".to_owned(), ttl_seconds: 86_400 }
    }
}
