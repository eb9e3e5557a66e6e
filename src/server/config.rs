//! Server configuration
//!
//! Settings are read from a YAML file and then overridden by environment
//! variables. A missing file means defaults.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analytics::InvalidEntryPolicy;

/// Default port number
pub const DEFAULT_PORT: u16 = 8787;

/// Config file name used when `WAGEBOOK_CONFIG` is not set
pub const CONFIG_FILENAME: &str = "wagebook.yaml";

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for [`ServerConfig`]
    #[error("config format error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port, 0 picks a free port
    pub port: u16,
    /// Listening address
    pub bind_address: IpAddr,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Shared token required on user routes; `None` disables auth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Offset of local time from UTC, defines calendar days and weekdays
    pub utc_offset_minutes: i32,
    /// What aggregations do with entries whose hours or wage are invalid
    pub invalid_entry_policy: InvalidEntryPolicy,
    /// `tracing` filter directive, `RUST_LOG` takes precedence
    pub log_filter: String,
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wagebook")
        .join("wagebook.db")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            database_path: default_database_path(),
            api_token: None,
            utc_offset_minutes: Local::now().offset().local_minus_utc() / 60,
            invalid_entry_policy: InvalidEntryPolicy::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load the config file named by the environment and apply overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::load(&Self::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the config file: `WAGEBOOK_CONFIG`, else `./wagebook.yaml`
    pub fn config_path() -> PathBuf {
        std::env::var_os("WAGEBOOK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
    }

    /// Apply `WAGEBOOK_*` overrides obtained through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("WAGEBOOK_PORT") {
            self.port = parse_var("WAGEBOOK_PORT", &port)?;
        }
        if let Some(bind) = lookup("WAGEBOOK_BIND") {
            self.bind_address = parse_var("WAGEBOOK_BIND", &bind)?;
        }
        if let Some(path) = lookup("WAGEBOOK_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(token) = lookup("WAGEBOOK_API_TOKEN") {
            self.api_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(offset) = lookup("WAGEBOOK_UTC_OFFSET") {
            self.utc_offset_minutes = parse_var("WAGEBOOK_UTC_OFFSET", &offset)?;
        }
        Ok(())
    }

    /// Validate a listening port
    ///
    /// Port must be 0 (ephemeral) or >= 1024
    pub fn validate_port(port: u16) -> Result<(), ConfigError> {
        if port != 0 && port < 1024 {
            return Err(ConfigError::Invalid(format!(
                "port {} is privileged, use 0 or >= 1024",
                port
            )));
        }
        Ok(())
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_port(self.port)?;
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes {} is outside +/-{}",
                self.utc_offset_minutes, MAX_OFFSET_MINUTES
            )));
        }
        if matches!(&self.api_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigError::Invalid("api_token must not be blank".to_string()));
        }
        Ok(())
    }

    /// Local time offset
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "utc_offset_minutes {} is not a valid offset",
                self.utc_offset_minutes
            ))
        })
    }

    /// Address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}={:?}: {}", key, value, e)))
}
