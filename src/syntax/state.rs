//! Line state for tracking open regions across lines

use serde::{Deserialize, Serialize};

use super::line_match::LineMatch;

/// Regions still open at the end of a line
///
/// Stored as the path of rule indices from the top-level rule list down
/// to the innermost open region, so it can be saved per line and handed
/// back to resume highlighting anywhere in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineState {
    regions: Vec<usize>,
}

impl LineState {
    /// State for being inside the regions named by `path`
    pub fn inside(path: Vec<usize>) -> Self {
        Self { regions: path }
    }

    /// Check if we're inside at least one region
    pub fn is_inside_region(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Check if we're at top level
    pub fn is_normal(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of open regions
    pub fn depth(&self) -> usize {
        self.regions.len()
    }

    /// Rule-index path to the innermost open region
    pub fn path(&self) -> &[usize] {
        &self.regions
    }

    pub(crate) fn push(&mut self, rule_idx: usize) {
        self.regions.push(rule_idx);
    }

    pub(crate) fn pop(&mut self) {
        self.regions.pop();
    }

    pub(crate) fn reset(&mut self) {
        self.regions.clear();
    }
}

/// Result of highlighting a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    /// Color boundaries for this line
    pub line_match: LineMatch,
    /// State at end of line (for next line)
    pub end_state: LineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_state() {
        let normal = LineState::default();
        assert!(normal.is_normal());
        assert!(!normal.is_inside_region());
        assert_eq!(normal.depth(), 0);

        let mut inside = LineState::inside(vec![2]);
        assert!(inside.is_inside_region());
        inside.push(0);
        assert_eq!(inside.path(), &[2, 0]);
        inside.pop();
        inside.pop();
        assert!(inside.is_normal());
    }

    #[test]
    fn test_state_can_be_saved() {
        let state = LineState::inside(vec![1, 3]);
        let saved = toml::to_string(&state).unwrap();
        let restored: LineState = toml::from_str(&saved).unwrap();
        assert_eq!(restored, state);
    }
}
