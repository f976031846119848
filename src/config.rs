//! Configuration file support
//!
//! Loads settings from ~/.syntaxhl.conf (or %USERPROFILE%\.syntaxhl.conf on
//! Windows). The `SYNTAXHL_CONFIG` environment variable names a different
//! file.
//!
//! Format: simple key=value pairs, one per line
//! Lines starting with # are comments
//!
//! Example:
//! ```text
//! # syntaxhl configuration
//! match-timeout-ms = 1000
//! backtrack-limit = 1000000
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::syntax::{MatchBudget, DEFAULT_BACKTRACK_LIMIT, DEFAULT_MATCH_TIMEOUT};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SYNTAXHL_CONFIG";

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Wall-clock budget for one match attempt
    pub match_timeout: Duration,
    /// Backtracking step budget for one match attempt
    pub backtrack_limit: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            match_timeout: DEFAULT_MATCH_TIMEOUT,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

impl HighlightConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntaxhl.conf"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntaxhl.conf"))
        }
    }

    /// Load configuration from the default location.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|err| {
                debug!(path = %path.display(), error = %err, "using default configuration");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::default();
        config.apply(&Self::parse(&contents));
        Ok(config)
    }

    /// Match budget for compiling patterns
    pub fn budget(&self) -> MatchBudget {
        MatchBudget {
            timeout: self.match_timeout,
            backtrack_limit: self.backtrack_limit,
        }
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> HashMap<String, String> {
        let mut settings = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse key = value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().to_string();
                settings.insert(key, value);
            }
        }

        settings
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) {
        if let Some(value) = settings.get("match-timeout-ms") {
            if let Ok(ms) = value.parse::<u64>() {
                self.match_timeout = Duration::from_millis(ms.clamp(1, 60_000));
            }
        }

        if let Some(value) = settings.get("backtrack-limit") {
            if let Ok(n) = value.parse::<usize>() {
                self.backtrack_limit = n.max(1_000);
            }
        }
    }
}
