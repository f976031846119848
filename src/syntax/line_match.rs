//! Per-line highlighting output

use std::collections::BTreeMap;

use super::group::Group;

/// Sparse column -> group boundaries for one line
///
/// A key marks the column where a group becomes active. It stays active
/// until the next key or the end of the line. A `None` value reverts to
/// plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMatch {
    boundaries: BTreeMap<usize, Option<Group>>,
}

impl LineMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `group` becomes active at `column`, replacing any
    /// boundary already recorded there
    pub fn insert(&mut self, column: usize, group: Option<Group>) {
        self.boundaries.insert(column, group);
    }

    /// The group active at `column`: the value at the greatest key not
    /// after it, or `None` if there is no such key
    pub fn group_at(&self, column: usize) -> Option<&Group> {
        self.boundaries
            .range(..=column)
            .next_back()
            .and_then(|(_, group)| group.as_ref())
    }

    /// The boundary recorded exactly at `column`
    pub fn get(&self, column: usize) -> Option<Option<&Group>> {
        self.boundaries.get(&column).map(Option::as_ref)
    }

    /// Boundaries in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&Group>)> + '_ {
        self.boundaries.iter().map(|(&column, group)| (column, group.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}
