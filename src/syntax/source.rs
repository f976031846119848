//! Declarative definition source
//!
//! The parsed form of a syntax file before any pattern is compiled.
//! Definitions are written in TOML:
//!
//! ```toml
//! filetype = "c"
//!
//! [detect]
//! filename = "\\.(c|h)$"
//! extensions = ["cc"]
//!
//! [[rules]]
//! group = "keyword"
//! pattern = "\\b(if|else|while)\\b"
//!
//! [[rules]]
//! group = "constant.string"
//! start = "\""
//! end = "\""
//! skip = "\\\\."
//!
//! [[rules.rules]]
//! group = "constant.specialChar"
//! pattern = "\\\\."
//! ```

use serde::Deserialize;

use crate::error::Result;

/// A whole syntax file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DefinitionSource {
    pub filetype: String,
    #[serde(default)]
    pub detect: DetectSource,
    #[serde(default)]
    pub rules: Vec<RuleSource>,
}

impl DefinitionSource {
    /// Parse a definition from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// The `[detect]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetectSource {
    /// Regex matched against the file name
    pub filename: Option<String>,
    /// Regex matched against the first line of the file
    pub header: Option<String>,
    /// Regex matched against the first lines to pick between several
    /// definitions whose filename patterns all match
    pub signature: Option<String>,
    /// Extra file extensions, matched case-insensitively
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// One `[[rules]]` entry
///
/// Either `pattern` is set, or both `start` and `end` are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleSource {
    pub group: String,
    pub pattern: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub skip: Option<String>,
    pub limit_group: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSource>,
}

impl RuleSource {
    /// A pattern rule entry
    pub fn pattern(group: &str, pattern: &str) -> Self {
        Self {
            group: group.to_string(),
            pattern: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    /// A region rule entry
    pub fn region(group: &str, start: &str, end: &str) -> Self {
        Self {
            group: group.to_string(),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Default::default()
        }
    }

    /// Builder: set nested rules
    pub fn with_rules(mut self, rules: Vec<RuleSource>) -> Self {
        self.rules = rules;
        self
    }

    /// Builder: set the skip pattern
    pub fn with_skip(mut self, skip: &str) -> Self {
        self.skip = Some(skip.to_string());
        self
    }

    /// Whether this entry describes a region
    pub fn is_region(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}
