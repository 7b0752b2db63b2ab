//! Server configuration.
//!
//! Loaded in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file named by `TAKEOFF_CONFIG`, if set
//! 3. `TAKEOFF_BIND`, `TAKEOFF_STORE_PATH` and `TAKEOFF_LOG_JSON`
//!
//! ```toml
//! bind = "127.0.0.1:8080"
//! store_path = "/var/lib/takeoff/reports.json"
//! log_json = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

pub const CONFIG_ENV: &str = "TAKEOFF_CONFIG";
pub const BIND_ENV: &str = "TAKEOFF_BIND";
pub const STORE_PATH_ENV: &str = "TAKEOFF_STORE_PATH";
pub const LOG_JSON_ENV: &str = "TAKEOFF_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// JSON report file; the in-memory store is used when absent
    pub store_path: Option<PathBuf>,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: DEFAULT_BIND.to_string(),
            store_path: None,
            log_json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = lookup(BIND_ENV).filter(|b| !b.trim().is_empty()) {
            config.bind = bind.trim().to_string();
        }

        if let Some(path) = lookup(STORE_PATH_ENV) {
            let path = path.trim();
            config.store_path = if path.is_empty() { None } else { Some(PathBuf::from(path)) };
        }

        if let Some(flag) = lookup(LOG_JSON_ENV) {
            config.log_json = parse_flag(LOG_JSON_ENV, &flag)?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_sources(env(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind, DEFAULT_BIND);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_sources(env(&[
            (BIND_ENV, "127.0.0.1:9000"),
            (STORE_PATH_ENV, "/tmp/reports.json"),
            (LOG_JSON_ENV, "true"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/reports.json")));
        assert!(config.log_json);
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!("takeoff_config_{}.toml", std::process::id()));
        fs::write(&path, "bind = \"127.0.0.1:7000\"\nstore_path = \"/data/r.json\"\n").unwrap();

        let config_path = path.display().to_string();
        let config = ServerConfig::from_sources(env(&[
            (CONFIG_ENV, config_path.as_str()),
            (STORE_PATH_ENV, ""),
        ]))
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:7000");
        assert!(config.store_path.is_none());
        assert!(!config.log_json);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            ServerConfig::from_sources(env(&[(LOG_JSON_ENV, "maybe")])),
            Err(ConfigError::InvalidEnv { .. })
        ));
        assert!(matches!(
            ServerConfig::from_sources(env(&[(CONFIG_ENV, "/nonexistent/takeoff.toml")])),
            Err(ConfigError::Io { .. })
        ));
    }
}
