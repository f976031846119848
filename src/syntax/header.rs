//! Filetype detection
//!
//! A header carries everything needed to decide whether a definition
//! applies to a file, without compiling any of its rules.

use std::path::Path;

use regex::Regex;

use super::source::DefinitionSource;
use crate::error::{Error, Result};

/// Detection metadata for one definition
#[derive(Debug, Clone)]
pub struct Header {
    filetype: String,
    filename: Option<Regex>,
    header: Option<Regex>,
    signature: Option<Regex>,
    extensions: Vec<String>,
}

impl Header {
    /// Create a header that matches nothing
    pub fn new(filetype: &str) -> Self {
        Self {
            filetype: filetype.to_string(),
            filename: None,
            header: None,
            signature: None,
            extensions: Vec::new(),
        }
    }

    /// Build the header of a parsed definition
    pub fn from_source(source: &DefinitionSource) -> Result<Self> {
        let detect = &source.detect;
        let mut header = Self::new(&source.filetype);
        header.filename = detect.filename.as_deref().map(compile).transpose()?;
        header.header = detect.header.as_deref().map(compile).transpose()?;
        header.signature = detect.signature.as_deref().map(compile).transpose()?;
        for ext in &detect.extensions {
            header.add_extension(ext);
        }
        Ok(header)
    }

    /// Builder: set the filename pattern
    pub fn with_filename(mut self, pattern: &str) -> Result<Self> {
        self.filename = Some(compile(pattern)?);
        Ok(self)
    }

    /// Builder: set the first-line pattern
    pub fn with_header(mut self, pattern: &str) -> Result<Self> {
        self.header = Some(compile(pattern)?);
        Ok(self)
    }

    /// Builder: set the signature pattern
    pub fn with_signature(mut self, pattern: &str) -> Result<Self> {
        self.signature = Some(compile(pattern)?);
        Ok(self)
    }

    /// Add a file extension alias (without the dot)
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.trim_start_matches('.').to_lowercase());
    }

    pub fn filetype(&self) -> &str {
        &self.filetype
    }

    /// Whether the definition applies to a file with this name
    pub fn match_file_name(&self, name: &str) -> bool {
        if self.filename.as_ref().is_some_and(|re| re.is_match(name)) {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Whether the first line of a file identifies this filetype
    pub fn match_file_header(&self, first_line: &str) -> bool {
        self.header.as_ref().is_some_and(|re| re.is_match(first_line))
    }

    /// Whether a line carries this filetype's signature
    pub fn match_file_signature(&self, line: &str) -> bool {
        self.signature.as_ref().is_some_and(|re| re.is_match(line))
    }

    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::Detect {
        pattern: pattern.to_string(),
        source: err,
    })
}
