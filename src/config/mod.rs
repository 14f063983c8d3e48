//! Configuration loading and management
//!
//! Settings come from an optional YAML file and are then overridden from the
//! environment. [`AppConfig::load`] does both and validates the result.

use crate::core::error::ConfigError;
use crate::core::invoice::Customer;
use crate::core::session::LOGIN_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BIND_ENV: &str = "DASHBOARD_BIND";
pub const STORAGE_ENV: &str = "DASHBOARD_STORAGE";

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_page_size() -> usize {
    6
}

fn default_max_connections() -> u32 {
    5
}

fn default_login_path() -> String {
    LOGIN_PATH.to_string()
}

fn default_session_ttl() -> u64 {
    86_400
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Invoices per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            page_size: default_page_size(),
        }
    }
}

/// Which store implementation to run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    #[default]
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => f.write_str("postgres"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "storage.backend".to_string(),
                value: other.to_string(),
                message: "expected 'postgres' or 'memory'".to_string(),
            }),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Postgres connection string; required for the postgres backend
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Customers seeded into the memory backend
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: None,
            max_connections: default_max_connections(),
            customers: Vec::new(),
        }
    }
}

/// A user allowed to sign in, with an Argon2 PHC hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Sign-in and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Users for the memory backend
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            session_ttl_secs: default_session_ttl(),
            users: Vec::new(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            file: None,
            message: e.to_string(),
        })
    }

    /// Override settings from environment variables
    ///
    /// `lookup` is usually `std::env::var(..).ok()`; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.storage.url = Some(url);
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(backend) = lookup(STORAGE_ENV) {
            self.storage.backend = backend.parse()?;
        }
        Ok(())
    }

    /// Check the settings that would otherwise fail at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres
            && self.storage.url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::MissingField {
                field: "storage.url".to_string(),
                context: format!("postgres storage (or set {})", DATABASE_URL_ENV),
            });
        }

        if self.server.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.page_size".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        self.bind_addr()?;

        if !self.auth.login_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "auth.login_path".to_string(),
                value: self.auth.login_path.clone(),
                message: "must be an absolute path".to_string(),
            });
        }

        Ok(())
    }

    /// The listener address
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                message: e.to_string(),
            })
    }

    /// File (if any), then environment, then validation
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
}
