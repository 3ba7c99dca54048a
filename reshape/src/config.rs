//! # Configuration
//!
//! Settings are read from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) yields a working local setup. Command-line flags override the
//! values loaded here.
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:50051"
//! reflection = true
//!
//! [client]
//! url = "http://127.0.0.1:50051"
//! timeout_ms = 5000
//!
//! [log]
//! filter = "reshape=info,user_service=info"
//! ```
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_LOG_FILTER: &str = "reshape=info,user_service=info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the registry listens on.
    pub addr: SocketAddr,
    /// Expose `grpc.reflection.v1` next to the registry.
    pub reflection: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            reflection: true,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: format!("http://{}:{}", Ipv4Addr::LOCALHOST, DEFAULT_PORT),
            timeout_ms: 5000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_loopback() {
        let config = Config::load(None).unwrap();

        assert_eq!(config.server.addr.to_string(), "127.0.0.1:50051");
        assert!(config.server.reflection);
        assert_eq!(config.client.url, "http://127.0.0.1:50051");
        assert_eq!(config.client.timeout(), Duration::from_secs(5));
        assert_eq!(config.log.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            addr = "127.0.0.1:6000"

            [client]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.server.addr.port(), 6000);
        assert!(config.server.reflection);
        assert_eq!(config.client.url, ClientConfig::default().url);
        assert_eq!(config.client.timeout(), Duration::from_millis(250));
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("[server]\nport = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/reshape.toml");
        let err = Config::load(Some(path)).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here/reshape.toml"));
    }
}
