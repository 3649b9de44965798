//! Configuration management for the catalog server
//!
//! Configuration comes from environment variables (optionally seeded from a
//! `.env` file by the binary), from a TOML file, and finally from
//! command-line overrides applied by the `serve` command.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default browser origin allowed by CORS
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default database url (in-memory store)
pub const DEFAULT_DATABASE_URL: &str = "memory://";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen host
    pub host: IpAddr,

    /// Listen port
    pub port: u16,

    /// The single origin allowed to make cross-origin requests
    pub cors_origin: String,

    /// Enable per-request trace logging
    pub enable_request_logging: bool,
}

/// Document store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Store url: `memory://`, `sqlite::memory:`, `sqlite://<path>` or a bare path
    pub url: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Store backend selected by [`DatabaseConfig::url`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    SqliteInMemory,
    SqliteFile(PathBuf),
    /// A url with a scheme no backend understands
    Unsupported(String),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            cors_origin: String::from(DEFAULT_CORS_ORIGIN),
            enable_request_logging: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Resolve the url to a backend
    pub fn backend(&self) -> StoreBackend {
        let url = self.url.trim();

        match url {
            "memory" | "memory://" => return StoreBackend::Memory,
            "sqlite::memory:" | "sqlite://:memory:" | ":memory:" => {
                return StoreBackend::SqliteInMemory
            }
            _ => {}
        }

        if let Some(path) = url.strip_prefix("sqlite://") {
            return StoreBackend::SqliteFile(PathBuf::from(path));
        }
        if let Some(path) = url.strip_prefix("sqlite:") {
            return StoreBackend::SqliteFile(PathBuf::from(path));
        }
        if url.contains("://") {
            return StoreBackend::Unsupported(url.to_string());
        }

        StoreBackend::SqliteFile(PathBuf::from(url))
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("HOST")
            .ok()
            .and_then(|v| v.parse::<IpAddr>().ok())
            .unwrap_or(defaults.server.host);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.server.port);

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| String::from(DEFAULT_CORS_ORIGIN));

        let enable_request_logging = std::env::var("REQUEST_LOGGING")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.server.enable_request_logging);

        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("MONGODB_URI"))
            .unwrap_or_else(|_| String::from(DEFAULT_DATABASE_URL));

        let log_level = std::env::var("LOG_LEVEL").unwrap_or(defaults.logging.level);
        let log_format = std::env::var("LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                cors_origin,
                enable_request_logging,
            },
            database: DatabaseConfig::new(database_url),
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from a file when one is given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        let origin = &self.server.cors_origin;
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            anyhow::bail!("cors_origin must be an http(s) origin, got '{origin}'");
        }
        HeaderValue::from_str(origin)
            .with_context(|| format!("cors_origin is not a valid header value: '{origin}'"))?;

        if self.database.url.trim().is_empty() {
            anyhow::bail!("database url must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "log format must be 'text' or 'json', got '{}'",
                self.logging.format
            );
        }

        Ok(())
    }

    /// Socket address to listen on
    #[must_use]
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cors_origin() {
        let mut config = Config::default();
        config.server.cors_origin = String::from("*");
        assert!(config.validate().is_err());

        config.server.cors_origin = String::from("http://bad\norigin");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = String::from("xml");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.port = 8081;
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:8081");
    }

    #[test]
    fn test_backend_resolution() {
        assert_eq!(DatabaseConfig::new("memory://").backend(), StoreBackend::Memory);
        assert_eq!(
            DatabaseConfig::new("sqlite::memory:").backend(),
            StoreBackend::SqliteInMemory
        );
        assert_eq!(
            DatabaseConfig::new("sqlite://data/catalog.db").backend(),
            StoreBackend::SqliteFile(PathBuf::from("data/catalog.db"))
        );
        assert_eq!(
            DatabaseConfig::new("catalog.db").backend(),
            StoreBackend::SqliteFile(PathBuf::from("catalog.db"))
        );
        assert!(matches!(
            DatabaseConfig::new("mongodb://localhost/music").backend(),
            StoreBackend::Unsupported(_)
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 4000\n").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
