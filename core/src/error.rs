//! Unified error types for SysSentinel Core
//!
//! Structured error types instead of anyhow for better pattern matching
//! at the library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Session log errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Process scanner errors
    #[error("Process scan error: {0}")]
    ProcessScan(String),

    /// Filesystem watcher errors
    #[error("Filesystem watch error: {0}")]
    Watch(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("Failed to serialize config: {0}")]
    SerializeToml(#[from] toml::ser::Error),

    /// Failed to write config file
    #[error("Failed to write config file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Failed to create directory
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Session-log-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create log directory
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create/open log file
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize event
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to write to log file
    #[error("Failed to write to log file: {0}")]
    Write(std::io::Error),

    /// Failed to flush buffer
    #[error("Failed to flush log buffer: {0}")]
    Flush(std::io::Error),
}

/// Convenience type alias
pub type Result<T> = std::result::Result<T, CoreError>;
