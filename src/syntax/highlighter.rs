//! Line-by-line highlighting state machine
//!
//! Each line is scanned left to right. At every scan offset the
//! candidates are the end pattern of the innermost open region plus every
//! rule in the current scope. The leftmost match wins; ties go to the end
//! pattern, then declaration order. A region's skip pattern only hides
//! text from its end pattern, so nested rules still see skipped text.
//! Pattern rules never win with an empty match. Regions left open at the
//! end of a line are returned in the line's end state and resumed on the
//! next line.

use tracing::debug;

use super::definition::Definition;
use super::group::Group;
use super::line_match::LineMatch;
use super::pattern::{Columns, Match, Pattern};
use super::rules::{RegionRule, Rule};
use super::state::{HighlightResult, LineState};

/// Non-advancing steps allowed before the scan is forced forward one
/// character (zero-width region starts and ends can otherwise cycle)
const MAX_STALLED_STEPS: usize = 16;

/// What won at the current scan offset
#[derive(Debug, Clone, Copy)]
enum Candidate<'d> {
    End,
    Rule(usize, &'d Rule),
}

/// Highlighter for one definition
#[derive(Debug, Clone)]
pub struct Highlighter {
    definition: Definition,
}

impl Highlighter {
    pub fn new(definition: Definition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Highlight a whole string, one [`LineMatch`] per line
    pub fn highlight_string(&self, text: &str) -> Vec<LineMatch> {
        let mut state = LineState::default();
        split_lines(text)
            .map(|line| {
                let result = self.highlight_line(line, &state);
                state = result.end_state;
                result.line_match
            })
            .collect()
    }

    /// End state of every line, without keeping the boundaries
    pub fn highlight_states<'a, I>(&self, lines: I) -> Vec<LineState>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = LineState::default();
        lines
            .into_iter()
            .map(|line| {
                state = self.highlight_line(line, &state).end_state;
                state.clone()
            })
            .collect()
    }

    /// Re-highlight `lines[start..]`, given the state at the end of the
    /// line before `start`
    pub fn resume_from(&self, lines: &[&str], start: usize, state: LineState) -> Vec<HighlightResult> {
        let mut state = state;
        lines
            .iter()
            .skip(start)
            .map(|line| {
                let result = self.highlight_line(line, &state);
                state = result.end_state.clone();
                result
            })
            .collect()
    }

    /// Highlight a single line of text
    ///
    /// Takes the line text and the state from the previous line.
    /// Returns the boundaries and the state for the next line.
    pub fn highlight_line(&self, line: &str, prev_state: &LineState) -> HighlightResult {
        let mut state = prev_state.clone();
        if state.is_inside_region() && self.definition.region_at(state.path()).is_none() {
            // State from a different definition - reset
            debug!(path = ?state.path(), "discarding unknown line state");
            state.reset();
        }

        let columns = Columns::new(line);
        let mut line_match = LineMatch::new();

        // Continuing an open region: its group is the line's background
        if let Some(region) = self.definition.region_at(state.path()) {
            line_match.insert(0, Some(region.group().clone()));
        }

        let mut pos = 0;
        let mut stalled = 0;
        while pos <= line.len() {
            let region = self.definition.region_at(state.path());
            let rules = region.map_or(self.definition.rules(), RegionRule::rules);

            let Some((candidate, m)) = next_match(region, rules, line, pos) else {
                break;
            };

            let before = pos;
            match candidate {
                Candidate::Rule(_, Rule::Pattern(rule)) => {
                    line_match.insert(columns.column(m.start), Some(rule.group().clone()));
                    line_match.insert(columns.column(m.end), region.map(|r| r.group().clone()));
                    pos = m.end;
                }
                Candidate::Rule(idx, Rule::Region(rule)) => {
                    let open = columns.column(m.start);
                    match rule.limit_group() {
                        Some(limit) => {
                            line_match.insert(open, Some(limit.clone()));
                            if !m.is_empty() {
                                line_match.insert(columns.column(m.end), Some(rule.group().clone()));
                            }
                        }
                        None => line_match.insert(open, Some(rule.group().clone())),
                    }
                    state.push(idx);
                    pos = m.end;
                }
                Candidate::End => {
                    if let Some(limit) = region.and_then(RegionRule::limit_group) {
                        if !m.is_empty() {
                            line_match.insert(columns.column(m.start), Some(limit.clone()));
                        }
                    }
                    state.pop();
                    line_match.insert(columns.column(m.end), self.scope_group(&state));
                    pos = m.end;
                }
            }

            if pos == before {
                stalled += 1;
                if stalled >= MAX_STALLED_STEPS {
                    pos = step(line, pos);
                    stalled = 0;
                }
            } else {
                stalled = 0;
            }
        }

        HighlightResult {
            line_match,
            end_state: state,
        }
    }

    /// Group of the innermost open region, `None` at top level
    fn scope_group(&self, state: &LineState) -> Option<Group> {
        self.definition
            .region_at(state.path())
            .map(|region| region.group().clone())
    }
}

/// Find the winning candidate at or after `pos`
fn next_match<'d>(
    region: Option<&'d RegionRule>,
    rules: &'d [Rule],
    line: &str,
    pos: usize,
) -> Option<(Candidate<'d>, Match)> {
    let mut best = region
        .and_then(|region| find_end(region, line, pos))
        .map(|m| (Candidate::End, m));

    for (idx, rule) in rules.iter().enumerate() {
        // Nothing can start earlier than the scan offset
        if matches!(best, Some((_, m)) if m.start == pos) {
            break;
        }
        let found = match rule {
            Rule::Pattern(rule) => find_consuming(rule.pattern(), line, pos),
            Rule::Region(rule) => rule.start().find_from(line, pos),
        };
        if let Some(m) = found {
            if is_better(&best, &m) {
                best = Some((Candidate::Rule(idx, rule), m));
            }
        }
    }

    best
}

/// Leftmost end match at or after `pos` that does not start inside text
/// matched by the region's skip pattern
fn find_end(region: &RegionRule, line: &str, pos: usize) -> Option<Match> {
    let mut from = pos;
    loop {
        let end = region.end().find_from(line, from)?;
        match region.skip().and_then(|skip| skip.find_from(line, from)) {
            Some(skip) if !skip.is_empty() && skip.start <= end.start => from = skip.end,
            _ => return Some(end),
        }
    }
}

/// Leftmost non-empty match at or after `pos`
fn find_consuming(pattern: &Pattern, line: &str, pos: usize) -> Option<Match> {
    let mut from = pos;
    while from <= line.len() {
        let m = pattern.find_from(line, from)?;
        if !m.is_empty() {
            return Some(m);
        }
        from = step(line, m.start);
    }
    None
}

fn is_better(best: &Option<(Candidate<'_>, Match)>, m: &Match) -> bool {
    best.as_ref().map_or(true, |(_, b)| m.start < b.start)
}

/// Byte offset one character past `pos`
fn step(line: &str, pos: usize) -> usize {
    match line.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(c) => pos + c.len_utf8(),
        None => line.len() + 1,
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::group::GroupRegistry;

    fn highlighter(toml: &str) -> (Highlighter, GroupRegistry) {
        let registry = GroupRegistry::new();
        let definition = Definition::from_toml(toml, &registry).unwrap();
        (Highlighter::new(definition), registry)
    }

    fn name_at(lm: &LineMatch, column: usize) -> &str {
        lm.group_at(column).map_or("", Group::name)
    }

    const C_LIKE: &str = r#"
filetype = "c-like"

[detect]
filename = "\\.cl$"

[[rules]]
group = "keyword"
pattern = "\\b(if|else|while)\\b"

[[rules]]
group = "constant.number"
pattern = "\\b\\d+\\b"

[[rules]]
group = "comment"
start = "/\\*"
end = "\\*/"

[[rules.rules]]
group = "todo"
pattern = "TODO"

[[rules]]
group = "constant.string"
start = "\""
end = "\""
skip = "\\\\."
"#;

    #[test]
    fn test_simple_highlighting() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("while x 42", &LineState::default());

        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 0), "keyword");
        assert_eq!(name_at(&result.line_match, 5), "");
        assert_eq!(name_at(&result.line_match, 8), "constant.number");
        assert_eq!(name_at(&result.line_match, 9), "constant.number");
    }

    #[test]
    fn test_region_start() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("if /* open", &LineState::default());

        assert_eq!(result.end_state, LineState::inside(vec![2]));
        assert_eq!(name_at(&result.line_match, 0), "keyword");
        assert_eq!(name_at(&result.line_match, 2), "");
        assert_eq!(name_at(&result.line_match, 3), "comment");
        assert_eq!(name_at(&result.line_match, 9), "comment");
    }

    #[test]
    fn test_region_continue() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("still 42 TODO", &LineState::inside(vec![2]));

        assert!(result.end_state.is_inside_region());
        assert_eq!(name_at(&result.line_match, 0), "comment");
        // top-level rules do not apply inside the comment
        assert_eq!(name_at(&result.line_match, 6), "comment");
        assert_eq!(name_at(&result.line_match, 9), "todo");
        assert_eq!(name_at(&result.line_match, 12), "todo");
    }

    #[test]
    fn test_region_end() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("end */ if", &LineState::inside(vec![2]));

        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 4), "comment");
        assert_eq!(name_at(&result.line_match, 5), "comment");
        assert_eq!(name_at(&result.line_match, 6), "");
        assert_eq!(name_at(&result.line_match, 7), "keyword");
    }

    #[test]
    fn test_nested_rule_reverts_to_region() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("/* TODO later */", &LineState::default());

        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 3), "todo");
        assert_eq!(name_at(&result.line_match, 7), "comment");
        assert_eq!(name_at(&result.line_match, 15), "comment");
        assert_eq!(name_at(&result.line_match, 16), "");
    }

    #[test]
    fn test_skip_pattern() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line(r#""a\"b" 1"#, &LineState::default());

        assert!(result.end_state.is_normal());
        for column in 0..6 {
            assert_eq!(name_at(&result.line_match, column), "constant.string");
        }
        assert_eq!(name_at(&result.line_match, 6), "");
        assert_eq!(name_at(&result.line_match, 7), "constant.number");
    }

    #[test]
    fn test_skip_leaves_escapes_to_nested_rules() {
        let (hl, _) = highlighter(
            r#"
filetype = "escapes"

[[rules]]
group = "constant.string"
start = "\""
end = "\""
skip = "\\\\."

[[rules.rules]]
group = "constant.specialChar"
pattern = "\\\\."
"#,
        );

        let lm = &hl.highlight_string(r#""a\nb" x"#)[0];
        assert_eq!(name_at(lm, 1), "constant.string");
        assert_eq!(name_at(lm, 2), "constant.specialChar");
        assert_eq!(name_at(lm, 3), "constant.specialChar");
        assert_eq!(name_at(lm, 4), "constant.string");
        assert_eq!(name_at(lm, 5), "constant.string");
        assert_eq!(name_at(lm, 6), "");

        // An escaped quote is colored and does not close the string
        let result = hl.highlight_line(r#""a\"b" x"#, &LineState::default());
        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 2), "constant.specialChar");
        assert_eq!(name_at(&result.line_match, 4), "constant.string");
        assert_eq!(name_at(&result.line_match, 5), "constant.string");
        assert_eq!(name_at(&result.line_match, 6), "");
    }

    #[test]
    fn test_empty_match_does_not_shadow_later_rule() {
        let (hl, _) = highlighter(
            r#"
filetype = "shadow"

[[rules]]
group = "ahead"
pattern = "(?=a)"

[[rules]]
group = "run"
pattern = "a+"
"#,
        );

        let lm = &hl.highlight_string("xaaa")[0];
        assert_eq!(name_at(lm, 0), "");
        assert_eq!(name_at(lm, 1), "run");
        assert_eq!(name_at(lm, 3), "run");
        assert!(lm.iter().all(|(_, group)| group.map_or(true, |g| g.name() != "ahead")));
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let (hl, _) = highlighter(
            r#"
filetype = "tie"

[[rules]]
group = "first"
pattern = "ab"

[[rules]]
group = "second"
pattern = "abc"
"#,
        );
        let lm = &hl.highlight_string("abc")[0];
        assert_eq!(name_at(lm, 0), "first");
        assert_eq!(name_at(lm, 2), "");
    }

    #[test]
    fn test_end_wins_tie_with_nested_rule() {
        let (hl, _) = highlighter(
            r#"
filetype = "tie"

[[rules]]
group = "block"
start = "<"
end = "(?=>)"

[[rules.rules]]
group = "angle"
pattern = ">"
"#,
        );
        let result = hl.highlight_line("<x>", &LineState::default());
        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 1), "block");
        assert_eq!(name_at(&result.line_match, 2), "");
    }

    #[test]
    fn test_limit_group() {
        let (hl, _) = highlighter(
            r#"
filetype = "limit"

[[rules]]
group = "constant.string"
start = "\""
end = "\""
limit-group = "symbol.delim"
"#,
        );
        let lm = &hl.highlight_string(r#"x "ab" y"#)[0];
        assert_eq!(name_at(lm, 0), "");
        assert_eq!(name_at(lm, 2), "symbol.delim");
        assert_eq!(name_at(lm, 3), "constant.string");
        assert_eq!(name_at(lm, 4), "constant.string");
        assert_eq!(name_at(lm, 5), "symbol.delim");
        assert_eq!(name_at(lm, 6), "");
    }

    #[test]
    fn test_zero_width_rule_terminates() {
        let (hl, _) = highlighter(
            r#"
filetype = "zero"

[[rules]]
group = "empty"
pattern = "(?=a)"

[[rules]]
group = "region"
start = "(?=b)"
end = "(?=b)"
"#,
        );
        let result = hl.highlight_line("aabb", &LineState::default());
        assert_eq!(name_at(&result.line_match, 0), "");
        assert_eq!(name_at(&result.line_match, 1), "");
    }

    #[test]
    fn test_unknown_state_is_reset() {
        let (hl, _) = highlighter(C_LIKE);
        let result = hl.highlight_line("if", &LineState::inside(vec![0, 9]));
        assert!(result.end_state.is_normal());
        assert_eq!(name_at(&result.line_match, 0), "keyword");
    }

    #[test]
    fn test_highlight_states_and_resume() {
        let (hl, _) = highlighter(C_LIKE);
        let lines = ["a /* b", "c", "d */ 1", "2"];

        let states = hl.highlight_states(lines);
        assert_eq!(
            states,
            vec![
                LineState::inside(vec![2]),
                LineState::inside(vec![2]),
                LineState::default(),
                LineState::default(),
            ]
        );

        let resumed = hl.resume_from(&lines, 1, states[0].clone());
        assert_eq!(resumed.len(), 3);
        assert_eq!(name_at(&resumed[0].line_match, 0), "comment");
        assert_eq!(name_at(&resumed[1].line_match, 5), "constant.number");

        let full = hl.highlight_string(&lines.join("\n"));
        for (i, result) in resumed.iter().enumerate() {
            assert_eq!(result.line_match, full[i + 1]);
        }
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let (hl, _) = highlighter(C_LIKE);
        let matches = hl.highlight_string("if\r\n\r\n/*\r\n\r\n*/");
        assert_eq!(matches.len(), 5);
        assert_eq!(name_at(&matches[0], 1), "keyword");
        assert!(matches[1].is_empty());
        assert_eq!(name_at(&matches[3], 0), "comment");
        assert_eq!(name_at(&matches[4], 2), "");
    }

    #[test]
    fn test_combining_marks_share_a_column() {
        let (hl, _) = highlighter(
            r#"
filetype = "marks"

[[rules]]
group = "word"
pattern = "x\\w*"
"#,
        );
        // "e" + combining acute accent counts as one column
        let lm = &hl.highlight_string("e\u{301} xe\u{301}y z")[0];
        assert_eq!(name_at(lm, 1), "");
        assert_eq!(name_at(lm, 2), "word");
        assert_eq!(name_at(lm, 4), "word");
        assert_eq!(name_at(lm, 5), "");
        assert_eq!(lm.get(5), Some(None));
    }
}
