//! Budgeted regex matching with lookaround support
//!
//! Rule patterns may contain lookahead, negative lookahead, lookbehind and
//! negative lookbehind. Those need a backtracking engine, so every match
//! attempt is bounded: the engine stops after a fixed number of
//! backtracking steps, and an attempt that takes longer than the time
//! budget is discarded. Either way the attempt is reported as no match.

use std::time::{Duration, Instant};

use fancy_regex::{Regex, RegexBuilder};
use tracing::warn;
use unicode_normalization::char::is_combining_mark;

use crate::error::{Error, Result};

/// Default wall-clock budget for a single match attempt
pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Default backtracking step limit for a single match attempt
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// Characters of input quoted in timeout warnings
const SAMPLE_CHARS: usize = 40;

/// Per-attempt matching budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBudget {
    /// Wall-clock time one attempt may take
    pub timeout: Duration,
    /// Backtracking steps one attempt may take
    pub backtrack_limit: usize,
}

impl Default for MatchBudget {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_MATCH_TIMEOUT,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

/// Consumed span of a match, as byte offsets into the searched line
///
/// Lookaround assertions never contribute to the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

impl Match {
    /// A match that consumed nothing (pure lookaround, `$`, ...)
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A compiled rule pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    timeout: Duration,
}

impl Pattern {
    /// Compile a pattern with the default budget
    pub fn new(source: &str) -> Result<Self> {
        Self::with_budget(source, MatchBudget::default())
    }

    /// Compile a pattern with an explicit budget
    pub fn with_budget(source: &str, budget: MatchBudget) -> Result<Self> {
        let mut builder = RegexBuilder::new(source);
        builder.backtrack_limit(budget.backtrack_limit);
        let regex = builder.build().map_err(|err| Error::Pattern {
            pattern: source.to_string(),
            source: err,
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
            timeout: budget.timeout,
        })
    }

    /// The pattern as written in the definition
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Find the leftmost match starting at or after byte offset `start`.
    ///
    /// Text before `start` stays visible to lookbehind and `\b`. Running
    /// out of budget is logged and reported as `None`.
    pub fn find_from(&self, text: &str, start: usize) -> Option<Match> {
        if start > text.len() {
            return None;
        }

        let began = Instant::now();
        let found = self.regex.find_from_pos(text, start);
        let elapsed = began.elapsed();

        match found {
            Ok(found) if elapsed <= self.timeout => found.map(|m| Match {
                start: m.start(),
                end: m.end(),
            }),
            Ok(_) => {
                warn!(
                    pattern = %self.source,
                    elapsed_ms = elapsed.as_millis() as u64,
                    sample = %sample(text, start),
                    "match exceeded time budget"
                );
                None
            }
            Err(err) => {
                warn!(
                    pattern = %self.source,
                    sample = %sample(text, start),
                    error = %err,
                    "match aborted"
                );
                None
            }
        }
    }

    /// Whether the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.find_from(text, 0).is_some()
    }
}

fn sample(text: &str, start: usize) -> &str {
    let tail = text.get(start..).unwrap_or("");
    match tail.char_indices().nth(SAMPLE_CHARS) {
        Some((idx, _)) => &tail[..idx],
        None => tail,
    }
}

/// Combining marks share a column with the character before them
pub fn is_mark(c: char) -> bool {
    is_combining_mark(c)
}

/// Convert a byte offset into a character column.
///
/// Combining marks do not advance the column. Offsets past the end or
/// inside a character are clamped to the previous boundary.
pub fn char_pos(text: &str, byte_offset: usize) -> usize {
    let mut end = byte_offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let head = &text[..end];
    if head.is_ascii() {
        return head.len();
    }
    head.chars().filter(|&c| !is_mark(c)).count()
}

/// Convert a code point index into a character column
pub fn char_pos_from_rune_pos(text: &str, rune_idx: usize) -> usize {
    text.chars().take(rune_idx).filter(|&c| !is_mark(c)).count()
}

/// Byte offset -> column lookup for one line
///
/// ASCII lines map offsets to themselves; other lines precompute a table
/// so repeated lookups stay linear in the line length.
#[derive(Debug)]
pub(crate) struct Columns {
    table: Option<Vec<usize>>,
}

impl Columns {
    pub(crate) fn new(line: &str) -> Self {
        if line.is_ascii() {
            return Self { table: None };
        }

        let mut table = vec![0; line.len() + 1];
        let mut column = 0;
        for (idx, c) in line.char_indices() {
            for slot in &mut table[idx..idx + c.len_utf8()] {
                *slot = column;
            }
            if !is_mark(c) {
                column += 1;
            }
        }
        table[line.len()] = column;
        Self { table: Some(table) }
    }

    pub(crate) fn column(&self, byte_offset: usize) -> usize {
        match &self.table {
            None => byte_offset,
            Some(table) => table[byte_offset.min(table.len() - 1)],
        }
    }
}
