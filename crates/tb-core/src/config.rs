//! Service configuration
//!
//! The configuration is assembled once per invocation (flags, environment,
//! or a TOML file), validated, and then handed read-only to the service.
//! The only later mutation is filling in `local_port` after the port
//! allocator has run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Fallback port when the remote address carries no explicit port.
const DEFAULT_REMOTE_PORT: u16 = 8088;

/// Configuration for the termbridge service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client identifier. Doubles as the relay routing key, the gateway
    /// route path, and the basic-auth username.
    pub name: String,

    /// Remote relay address (`host:port`)
    pub remote: String,

    /// Relay server port
    pub server_port: u16,

    /// Local gateway bind port. Stays 0 until the port allocator has run,
    /// which happens exactly once per service run.
    pub local_port: u16,

    /// Requested shell (zsh, bash, powershell, ...). Falls back to the
    /// platform default when unavailable.
    pub terminal: Option<String>,

    /// Keep the session in a tmux window so it survives reconnects
    pub tmux: bool,

    /// Shut the service down after 24 hours
    pub auto_exit: bool,

    /// Basic-auth password. Empty disables authentication.
    pub pass: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            remote: String::new(),
            server_port: 8022,
            local_port: 0,
            terminal: None,
            tmux: false,
            auto_exit: true,
            pass: String::new(),
        }
    }
}

impl Config {
    /// Validate the configuration. Must pass before any actor is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField("name".to_string()));
        }
        if self.remote.is_empty() {
            return Err(ConfigError::MissingField("remote".to_string()));
        }
        Ok(())
    }

    /// Host part of the remote address
    pub fn remote_host(&self) -> &str {
        match self.remote.split(':').next() {
            Some(host) if !host.is_empty() => host,
            _ => "localhost",
        }
    }

    /// Port part of the remote address
    pub fn remote_port(&self) -> u16 {
        self.remote
            .split(':')
            .nth(1)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_REMOTE_PORT)
    }

    /// Whether basic auth is enabled
    pub fn auth_enabled(&self) -> bool {
        !self.pass.is_empty()
    }
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("termbridge")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            name: "alice".to_string(),
            remote: "example.com:8022".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let config = Config {
            name: String::new(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "name"));
    }

    #[test]
    fn validate_rejects_empty_remote() {
        let config = Config {
            remote: String::new(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "remote"));
    }

    #[test]
    fn remote_parsing_splits_host_and_port() {
        let config = valid_config();
        assert_eq!(config.remote_host(), "example.com");
        assert_eq!(config.remote_port(), 8022);
    }

    #[test]
    fn remote_parsing_falls_back_without_port() {
        let config = Config {
            remote: "example.com".to_string(),
            ..valid_config()
        };
        assert_eq!(config.remote_host(), "example.com");
        assert_eq!(config.remote_port(), 8088);
    }

    #[test]
    fn defaults_match_cli_surface() {
        let config = Config::default();
        assert_eq!(config.server_port, 8022);
        assert_eq!(config.local_port, 0);
        assert!(config.auto_exit);
        assert!(!config.auth_enabled());
    }

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            pass: "secret".to_string(),
            terminal: Some("zsh".to_string()),
            ..valid_config()
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.terminal.as_deref(), Some("zsh"));
        assert!(loaded.auth_enabled());
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"alice\"\nremote = \"host:1\"\n").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.server_port, 8022);
        assert!(loaded.auto_exit);
    }
}
