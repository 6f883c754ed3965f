//! Configuration module for SysSentinel
//!
//! Handles loading, parsing, and validation of configuration files.
//! Default configuration path: `~/.syssentinel/config.toml`

use crate::error::{ConfigError, CoreError};
use crate::exclusion::{default_excluded_paths, default_excluded_processes};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Session log settings
    pub logging: LoggingConfig,
    /// Monitoring settings
    pub monitoring: MonitoringConfig,
    /// Noise suppression
    pub exclusions: ExclusionConfig,
}

impl Config {
    /// Load configuration from the default path (~/.syssentinel/config.toml)
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(content).map_err(ConfigError::ParseToml)?)
    }

    /// Get the base configuration directory path (~/.syssentinel)
    fn config_base_dir() -> Result<PathBuf, CoreError> {
        dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)
            .map(|home| home.join(".syssentinel"))
            .map_err(CoreError::Config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf, CoreError> {
        Self::config_base_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the default session log directory path
    pub fn default_log_dir() -> Result<PathBuf, CoreError> {
        Self::config_base_dir().map(|dir| dir.join("logs"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf, CoreError> {
        let config_dir = Self::config_base_dir()?;
        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::CreateDir {
                path: config_dir.clone(),
                source: e,
            })?;
        }
        Ok(config_dir)
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeToml)?;
        std::fs::write(path, content).map_err(|e| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose output
    pub verbose: bool,
    /// Default output format (pretty, json, compact)
    pub default_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            default_format: "pretty".to_string(),
        }
    }
}

/// Session log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write detected events to a JSONL session log
    pub enabled: bool,
    /// Log directory path (default: ~/.syssentinel/logs)
    pub log_dir: Option<PathBuf>,
    /// Log retention in days (0 = no limit)
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: None,
            retention_days: 30,
        }
    }
}

impl LoggingConfig {
    /// Get the effective log directory (custom or default)
    pub fn effective_log_dir(&self) -> Result<PathBuf, CoreError> {
        match &self.log_dir {
            Some(path) => Ok(path.clone()),
            None => Config::default_log_dir(),
        }
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Enable the periodic process scanner
    pub scan_processes: bool,
    /// Enable the filesystem change watcher
    pub watch_filesystem: bool,
    /// Directory watched recursively; `None` means the user's home directory
    pub watch_root: Option<PathBuf>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            scan_processes: true,
            watch_filesystem: true,
            watch_root: None,
        }
    }
}

impl MonitoringConfig {
    /// Resolve the watch root, falling back to the home directory
    pub fn effective_watch_root(&self) -> Result<PathBuf, CoreError> {
        match &self.watch_root {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)
                .map_err(CoreError::Config),
        }
    }
}

/// Noise suppression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Path substrings whose matches are never reported
    pub excluded_paths: Vec<String>,
    /// Process names (exact match) that are never reported
    pub excluded_processes: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            excluded_paths: default_excluded_paths(),
            excluded_processes: default_excluded_processes(),
        }
    }
}
