//! Error types for syntaxhl

use thiserror::Error;

/// Result type alias for syntaxhl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Highlighting error types
///
/// Everything here is raised while building a definition or loading
/// configuration. Scanning text never fails; a pattern that runs out of
/// budget is treated as not matching.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: fancy_regex::Error,
    },

    #[error("invalid detect pattern `{pattern}`: {source}")]
    Detect {
        pattern: String,
        source: regex::Error,
    },

    #[error("malformed rule `{group}` in {filetype}: {reason}")]
    Malformed {
        filetype: String,
        group: String,
        reason: &'static str,
    },

    #[error("failed to parse definition: {0}")]
    Parse(#[from] toml::de::Error),
}
