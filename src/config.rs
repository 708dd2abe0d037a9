//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::DEFAULT_TTL_SECS;

/// Default location of the cache database.
pub const DEFAULT_DB_PATH: &str = "data/cache.sqlite";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file
    pub db_path: PathBuf,
    /// TTL in seconds used when a caller passes no positive TTL
    pub default_ttl: i64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DB_PATH` - Database file (default: data/cache.sqlite)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("CACHE_DB_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl: &i64| *ttl > 0)
                .unwrap_or(DEFAULT_TTL_SECS),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            default_ttl: DEFAULT_TTL_SECS,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("data/cache.sqlite"));
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the env so parallel tests do not race
        env::remove_var("CACHE_DB_PATH");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);

        env::set_var("CACHE_DB_PATH", "/tmp/other.sqlite");
        env::set_var("DEFAULT_TTL", "-10");
        env::set_var("SERVER_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);

        // Saturates at the latest representable expiry when used
        env::set_var("DEFAULT_TTL", i64::MAX.to_string());
        assert_eq!(Config::from_env().default_ttl, i64::MAX);

        env::remove_var("CACHE_DB_PATH");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
    }
}
