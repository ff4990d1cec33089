//! Database configuration.
//!
//! Connection settings for the organization store. Configuration is loaded
//! from environment variables with defaults suitable for local development.

use sea_orm::ConnectOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (e.g., "sqlite://forge.db?mode=rwc", "postgres://...").
    pub url: String,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Minimum idle connections kept open.
    pub min_connections: u32,

    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Whether sqlx logs every statement.
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    /// Returns a local SQLite file database.
    fn default() -> Self {
        Self {
            url: "sqlite://forge.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FORGE_DATABASE_URL`: Connection URL (default: sqlite://forge.db?mode=rwc)
    /// - `FORGE_DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `FORGE_DATABASE_MIN_CONNECTIONS`: Idle connections (default: 1)
    /// - `FORGE_DATABASE_CONNECT_TIMEOUT_SECS`: Connect timeout (default: 8)
    /// - `FORGE_DATABASE_SQLX_LOGGING`: Log statements (default: false)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            url: std::env::var("FORGE_DATABASE_URL").unwrap_or(default.url),
            max_connections: std::env::var("FORGE_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_connections),
            min_connections: std::env::var("FORGE_DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.min_connections),
            connect_timeout_secs: std::env::var("FORGE_DATABASE_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.connect_timeout_secs),
            sqlx_logging: std::env::var("FORGE_DATABASE_SQLX_LOGGING")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.sqlx_logging),
        }
    }

    /// A private in-memory SQLite database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }

    /// Get the connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("FORGE_DATABASE_URL".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue {
                key: "min_connections".to_string(),
                message: format!("must not exceed max_connections ({})", self.max_connections),
            });
        }
        Ok(())
    }

    /// SeaORM connection options for this configuration.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout())
            .sqlx_logging(self.sqlx_logging);
        options
    }
}
