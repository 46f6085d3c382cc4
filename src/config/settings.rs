//! # Configuration Settings
//!
//! Defines the configuration structure for the Cinder secret service. Each
//! section has a `Default` for tests and a `from_env()` reader; the whole
//! tree is validated once at startup and then injected into the components
//! that need it. Nothing reads the environment after that point.

use crate::errors::{CinderError, Result};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Secret store configuration
    #[validate(nested)]
    pub secrets: SecretsConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            secrets: SecretsConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(CinderError::from)?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite://") {
            return Err(CinderError::validation("database URL must start with 'sqlite://'"));
        }

        match URL_SAFE.decode(&self.secrets.encryption_key) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => {
                return Err(CinderError::validation(format!(
                    "encryption key must decode to 32 bytes, got {}",
                    bytes.len()
                )));
            }
            Err(_) => {
                return Err(CinderError::validation(
                    "encryption key must be url-safe base64",
                ));
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create ServerConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match std::env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| CinderError::config(format!("Invalid HTTP_PORT: {}", e)))?,
            Err(_) => 8000,
        };

        Ok(Self { host, port })
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds; a request that cannot check out
    /// a connection within this bound fails rather than queueing forever
    #[validate(range(min = 1, max = 60, message = "Connect timeout must be between 1 and 60 seconds"))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic schema setup on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/cinder.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection acquire timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/cinder.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let connect_timeout_seconds = std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600);

        let auto_migrate = std::env::var("DATABASE_AUTO_MIGRATE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        Self {
            url,
            max_connections,
            min_connections,
            connect_timeout_seconds,
            idle_timeout_seconds,
            auto_migrate,
        }
    }
}

/// Secret store configuration: the process-wide encryption key and the two
/// background timers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecretsConfig {
    /// Url-safe base64 encoding of the 32-byte encryption key
    #[validate(length(min = 1, message = "Encryption key cannot be empty"))]
    pub encryption_key: String,

    /// Blanket cache-residency limit in seconds. Independent of each secret's
    /// own TTL: the cache sweep evicts entries older than this regardless of
    /// their declared lifetime, and the durable store remains authoritative.
    #[validate(range(min = 1, message = "Cache expiry must be at least 1 second"))]
    pub cache_expiry_seconds: u64,

    /// Interval between reaper sweeps in seconds
    #[validate(range(min = 1, message = "Cleanup interval must be at least 1 second"))]
    pub cleanup_interval_seconds: u64,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            // All-zero dev key; real deployments must set ENCRYPTION_KEY.
            encryption_key: "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_string(),
            cache_expiry_seconds: 300,
            cleanup_interval_seconds: 300,
        }
    }
}

impl SecretsConfig {
    /// Get cache residency limit as Duration
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_seconds)
    }

    /// Get reaper interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }

    /// Create SecretsConfig from environment variables.
    ///
    /// `ENCRYPTION_KEY` is required; there is no production fallback for key
    /// material.
    pub fn from_env() -> Result<Self> {
        let encryption_key = std::env::var("ENCRYPTION_KEY")
            .map_err(|_| CinderError::config("ENCRYPTION_KEY must be set"))?;

        let cache_expiry_seconds = std::env::var("CACHE_EXPIRY_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(300);

        let cleanup_interval_seconds = std::env::var("CLEANUP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(300);

        Ok(Self { encryption_key, cache_expiry_seconds, cleanup_interval_seconds })
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_logging =
            std::env::var("LOG_FORMAT").map(|s| s.to_lowercase() == "json").unwrap_or(false);

        Self { log_level, json_logging }
    }
}
