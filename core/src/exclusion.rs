//! Exclusion filtering for SysSentinel
//!
//! Pure predicate logic deciding whether a path or a process name is
//! expected noise to be suppressed before it becomes a reported event.

use crate::config::ExclusionConfig;
use std::collections::HashSet;
use std::path::Path;

/// Noise filter shared by both producers.
///
/// Stateless after construction and safe for concurrent read access.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    path_patterns: Vec<String>,
    process_names: HashSet<String>,
}

impl ExclusionFilter {
    /// Create a filter from explicit pattern lists
    pub fn new(path_patterns: Vec<String>, process_names: Vec<String>) -> Self {
        Self {
            path_patterns,
            process_names: process_names.into_iter().collect(),
        }
    }

    /// Create a filter from the loaded configuration
    pub fn from_config(config: &ExclusionConfig) -> Self {
        Self::new(
            config.excluded_paths.clone(),
            config.excluded_processes.clone(),
        )
    }

    /// True if the path contains any configured pattern as a substring
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.path_patterns
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
    }

    /// True if the process name exactly matches a configured excluded name
    pub fn is_process_excluded(&self, name: &str) -> bool {
        self.process_names.contains(name)
    }

    /// Configured path patterns
    pub fn path_patterns(&self) -> &[String] {
        &self.path_patterns
    }
}

/// Default noisy path fragments under a home directory
#[cfg(windows)]
pub fn default_excluded_paths() -> Vec<String> {
    vec![
        "AppData\\Local".to_string(),
        "AppData\\Roaming".to_string(),
        "Windows\\Prefetch".to_string(),
        "NTUSER.DAT".to_string(),
    ]
}

/// Default noisy path fragments under a home directory
#[cfg(not(windows))]
pub fn default_excluded_paths() -> Vec<String> {
    vec![
        ".cache".to_string(),
        ".local/share/Trash".to_string(),
        ".Trash".to_string(),
    ]
}

/// Default chatty system processes
#[cfg(windows)]
pub fn default_excluded_processes() -> Vec<String> {
    vec![
        "svchost.exe".to_string(),
        "conhost.exe".to_string(),
        "lsass.exe".to_string(),
        "SearchHost.exe".to_string(),
        "RuntimeBroker.exe".to_string(),
    ]
}

/// Default chatty system processes
#[cfg(not(windows))]
pub fn default_excluded_processes() -> Vec<String> {
    vec![
        "mdworker_shared".to_string(),
        "mds_stores".to_string(),
        "distnoted".to_string(),
        "kworker".to_string(),
    ]
}
