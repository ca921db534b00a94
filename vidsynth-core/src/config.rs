//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/vidsynth/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/vidsynth/` (~/.config/vidsynth/)
//! - State/Logs: `$XDG_STATE_HOME/vidsynth/` (~/.local/state/vidsynth/)
//!
//! The API base address can be overridden with `VIDSYNTH_API_BASE`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `api.base_url`
pub const API_BASE_ENV: &str = "VIDSYNTH_API_BASE";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Pipeline API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cluster sandbox configuration
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// Pipeline API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base address for REST calls, the event stream and relative media links.
    /// Empty means links stay relative.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds (not applied to the event stream)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Initial event stream reconnect delay in milliseconds
    #[serde(default = "default_reconnect_ms")]
    pub reconnect_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            reconnect_ms: default_reconnect_ms(),
        }
    }
}

impl ApiConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if !base.is_empty() && !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(Error::Config(format!(
                "api.base_url must start with http:// or https:// (got {:?})",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial reconnect delay as a [`Duration`]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_ms)
    }

    /// Replace the base address, trimming one trailing slash.
    pub fn set_base_url(&mut self, base: &str) {
        self.base_url = normalize_base(base);
    }
}

fn normalize_base(base: &str) -> String {
    let base = base.trim();
    base.strip_suffix('/').unwrap_or(base).to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_reconnect_ms() -> u64 {
    3000
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Cluster sandbox configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    /// Number of synthetic points per generation
    #[serde(default = "default_point_count")]
    pub point_count: usize,

    /// Initial cluster count shown in the label panel (2..=10)
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            point_count: default_point_count(),
            default_k: default_k(),
        }
    }
}

fn default_point_count() -> usize {
    50
}

fn default_k() -> usize {
    3
}

impl Config {
    /// Load configuration from the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        if let Ok(base) = std::env::var(API_BASE_ENV) {
            tracing::info!(base_url = %base, "Using API base from environment");
            config.api.base_url = base;
        }

        config.finish()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.finish()
    }

    /// Normalize and validate a freshly parsed config.
    fn finish(mut self) -> Result<Self> {
        self.api.base_url = normalize_base(&self.api.base_url);
        self.sandbox.default_k = self.sandbox.default_k.clamp(2, 10);
        self.api.validate()?;
        Ok(self)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/vidsynth/config.toml` (~/.config/vidsynth/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("vidsynth").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/vidsynth/` (~/.local/state/vidsynth/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("vidsynth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.reconnect_ms, 3000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.sandbox.point_count, 50);
        assert_eq!(config.sandbox.default_k, 3);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[api]
base_url = "https://pipeline.example.com"
timeout_secs = 10

[logging]
level = "debug"

[sandbox]
default_k = 6
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://pipeline.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.reconnect_ms, 3000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.sandbox.default_k, 6);
    }

    #[test]
    fn test_load_from_trims_trailing_slash_and_clamps_k() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://localhost:9000/\"\n[sandbox]\ndefault_k = 40\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.sandbox.default_k, 10);
    }

    #[test]
    fn test_base_url_validation() {
        let mut api = ApiConfig::default();
        assert!(api.validate().is_ok());

        api.base_url = String::new();
        assert!(api.validate().is_ok());

        api.base_url = "ftp://files".to_string();
        assert!(api.validate().is_err());

        api.set_base_url("https://host/");
        assert_eq!(api.base_url, "https://host");
        assert!(api.validate().is_ok());
    }

    #[test]
    fn test_to_toml_round_trips_base() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("base_url = \"http://127.0.0.1:8000\""));
    }
}
