//! Service configuration.
//!
//! Loaded from a YAML file, then overridden from the environment. Every
//! field has a default, so a partial file (or none at all) is enough:
//!
//! ```yaml
//! env: local
//! http_server:
//!   port: 8080
//!   request_timeout_ms: 4000
//! postgresql:
//!   host: localhost
//!   port: 5432
//!   database_name: orders
//!   username: postgres
//!   password: postgres
//! ingest:
//!   listen_addr: 0.0.0.0:4222
//!   strict_timestamps: false
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use orderflow_orders::domain::normalizer::TimestampPolicy;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Config file read when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config/local.yaml";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// The path that was tried.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An environment override or derived value is invalid.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Variable or field name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment environment label, for logs only.
    pub env: String,
    /// HTTP listener settings.
    pub http_server: HttpServerConfig,
    /// Relational backend settings.
    pub postgresql: PostgresConfig,
    /// Message consumer settings.
    pub ingest: IngestConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline; slower requests get 504.
    pub request_timeout_ms: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            request_timeout_ms: 4000,
        }
    }
}

impl HttpServerConfig {
    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "http_server.host",
                reason: format!("invalid HOST:PORT combination: {e}"),
            })
    }

    /// The request deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Relational backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Full connection URL; when set, the individual fields are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_owned(),
            port: 5432,
            database_name: "orders".to_owned(),
            username: "postgres".to_owned(),
            password: String::new(),
            max_connections: 10,
        }
    }
}

impl PostgresConfig {
    /// Connection options for the pool.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `url` is set but malformed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: e.to_string(),
            });
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database_name))
    }
}

/// Message consumer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Address the newline-delimited message feed listens on.
    pub listen_addr: String,
    /// Drop messages whose `date_created` does not parse, instead of keeping
    /// them with an epoch timestamp.
    pub strict_timestamps: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4222".to_owned(),
            strict_timestamps: false,
        }
    }
}

impl IngestConfig {
    /// How unparseable creation timestamps are treated.
    #[must_use]
    pub fn timestamp_policy(&self) -> TimestampPolicy {
        TimestampPolicy::from_strict(self.strict_timestamps)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_yaml::from_str(s)?)
    }
}

impl Config {
    /// Loads the config file named by `CONFIG_PATH` (or the default path) and
    /// applies environment overrides.
    ///
    /// A missing default file yields built-in defaults; a missing file that
    /// was asked for explicitly is an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or an
    /// override is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Reads and parses a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Applies `DATABASE_URL`, `HOST`, `PORT` and `INGEST_ADDR` from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `PORT` is not a valid `u16`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.postgresql.url = Some(url);
        }
        if let Some(host) = lookup("HOST") {
            self.http_server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.http_server.port = port.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("PORT must be a valid u16: {e}"),
            })?;
        }
        if let Some(addr) = lookup("INGEST_ADDR") {
            self.ingest.listen_addr = addr;
        }
        Ok(())
    }
}
