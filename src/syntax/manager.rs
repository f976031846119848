//! Syntax highlighting manager
//!
//! This module provides the SyntaxManager that holds the loaded
//! definitions and picks one for a file, and the HighlightCache that
//! keeps per-line states so an edited buffer only re-highlights from the
//! first changed line.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::definition::Definition;
use super::group::GroupRegistry;
use super::highlighter::Highlighter;
use super::line_match::LineMatch;
use super::pattern::MatchBudget;
use super::source::DefinitionSource;
use super::state::LineState;
use crate::error::Result;

/// Lines inspected for a signature match
const SIGNATURE_LINES: usize = 100;

/// Per-buffer highlighting cache
#[derive(Debug, Default)]
pub struct HighlightCache {
    /// State at the end of each highlighted line
    states: Vec<LineState>,
    /// Boundaries of each highlighted line
    matches: Vec<LineMatch>,
}

impl HighlightCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate cache from a specific line onwards
    pub fn invalidate_from(&mut self, line: usize) {
        self.states.truncate(line);
        self.matches.truncate(line);
    }

    /// Invalidate entire cache
    pub fn invalidate_all(&mut self) {
        self.invalidate_from(0);
    }

    /// Number of lines with up to date results
    pub fn valid_lines(&self) -> usize {
        self.matches.len()
    }

    /// Boundaries for `line_idx`, highlighting any stale lines before it
    pub fn line_match(&mut self, highlighter: &Highlighter, lines: &[&str], line_idx: usize) -> Option<&LineMatch> {
        if line_idx >= lines.len() {
            return None;
        }

        while self.matches.len() <= line_idx {
            let idx = self.matches.len();
            let result = match idx.checked_sub(1) {
                Some(prev) => highlighter.highlight_line(lines[idx], &self.states[prev]),
                None => highlighter.highlight_line(lines[idx], &LineState::default()),
            };
            self.states.push(result.end_state);
            self.matches.push(result.line_match);
        }

        self.matches.get(line_idx)
    }

    /// State at the end of `line_idx`, if it is up to date
    pub fn state_after(&self, line_idx: usize) -> Option<&LineState> {
        self.states.get(line_idx)
    }
}

/// Loaded definitions and filetype detection
#[derive(Debug, Default)]
pub struct SyntaxManager {
    highlighters: Vec<Highlighter>,
    registry: GroupRegistry,
    budget: MatchBudget,
}

impl SyntaxManager {
    /// Create a manager with its own group registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager that interns into `registry` and compiles
    /// patterns with `budget`
    pub fn with_registry(registry: GroupRegistry, budget: MatchBudget) -> Self {
        Self {
            highlighters: Vec::new(),
            registry,
            budget,
        }
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Add a compiled definition
    pub fn add_definition(&mut self, definition: Definition) {
        debug!(filetype = definition.filetype(), "added definition");
        self.highlighters.push(Highlighter::new(definition));
    }

    /// Compile and add a parsed definition
    pub fn add_source(&mut self, source: &DefinitionSource) -> Result<()> {
        let definition = Definition::from_source_with(source, &self.registry, self.budget)?;
        self.add_definition(definition);
        Ok(())
    }

    /// Load, compile and add a TOML definition file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.add_source(&DefinitionSource::from_toml(&text)?)
    }

    /// Get a highlighter by filetype name
    pub fn get(&self, filetype: &str) -> Option<&Highlighter> {
        self.highlighters.iter().find(|hl| hl.definition().filetype() == filetype)
    }

    /// Pick a highlighter for a file.
    ///
    /// Filename matches come first. When several definitions match the
    /// name, the first one whose signature appears in the opening lines
    /// wins, falling back to the first match. With no filename match the
    /// first line is tried against each header pattern.
    pub fn detect(&self, filename: &str, lines: &[&str]) -> Option<&Highlighter> {
        let by_name: Vec<&Highlighter> = self
            .highlighters
            .iter()
            .filter(|hl| hl.definition().header().match_file_name(filename))
            .collect();

        match by_name.as_slice() {
            [] => {}
            [only] => return Some(*only),
            [first, ..] => {
                let signed = by_name.iter().copied().find(|hl| {
                    let header = hl.definition().header();
                    header.has_signature()
                        && lines
                            .iter()
                            .take(SIGNATURE_LINES)
                            .any(|line| header.match_file_signature(line))
                });
                return Some(signed.unwrap_or(*first));
            }
        }

        let first_line = lines.first()?;
        self.highlighters
            .iter()
            .find(|hl| hl.definition().header().match_file_header(first_line))
    }

    /// List available filetypes
    pub fn list_filetypes(&self) -> Vec<&str> {
        let mut names: Vec<_> = self
            .highlighters
            .iter()
            .map(|hl| hl.definition().filetype())
            .collect();
        names.sort();
        names
    }
}
