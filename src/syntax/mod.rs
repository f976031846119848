//! Syntax highlighting module
//!
//! This module provides the highlighting engine:
//! - Group interning (`group`)
//! - Budgeted pattern matching with lookaround (`pattern`)
//! - Definitions, rules and filetype detection
//! - The line-by-line highlighter and its per-line state

mod definition;
mod group;
mod header;
mod highlighter;
mod line_match;
mod manager;
mod pattern;
mod rules;
mod source;
mod state;

pub use definition::Definition;
pub use group::{Group, GroupRegistry};
pub use header::Header;
pub use highlighter::Highlighter;
pub use line_match::LineMatch;
pub use manager::{HighlightCache, SyntaxManager};
pub use pattern::{
    char_pos, char_pos_from_rune_pos, is_mark, Match, MatchBudget, Pattern, DEFAULT_BACKTRACK_LIMIT,
    DEFAULT_MATCH_TIMEOUT,
};
pub use rules::{PatternRule, RegionRule, Rule};
pub use source::{DefinitionSource, DetectSource, RuleSource};
pub use state::{HighlightResult, LineState};
