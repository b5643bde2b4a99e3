use std::path::PathBuf;

use crate::message::bus::DEFAULT_CHANNEL_CAPACITY;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | database and log root |
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | ENVIRONMENT | development | development / production |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_JSON | false (true in production) | JSON console logs |
/// | LOG_TO_FILE | false | daily rolling log files |
/// | BROADCAST_CAPACITY | 1024 | per-channel broadcast buffer |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown window |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/catalog HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and logs
    pub work_dir: String,
    pub http_port: u16,
    /// development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_to_file: bool,
    /// Messages buffered per subscriber before it starts lagging
    pub broadcast_capacity: usize,
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = environment == "production";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_or("HTTP_PORT", 8080),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", production),
            log_to_file: env_or("LOG_TO_FILE", false),
            broadcast_capacity: env_or("BROADCAST_CAPACITY", DEFAULT_CHANNEL_CAPACITY).max(1),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
            environment,
        }
    }

    /// Override the work dir and port; used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Path of the product database
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("catalog.redb")
    }

    /// Directory for rolling log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work dir if missing
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/catalog-test", 9123);
        assert_eq!(config.http_port, 9123);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/catalog-test/catalog.redb")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/catalog-test/logs"));
        assert!(config.broadcast_capacity >= 1);
    }
}
