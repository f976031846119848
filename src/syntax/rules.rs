//! Rule tree for syntax highlighting
//!
//! A definition is an ordered list of rules. Pattern rules color a single
//! match; region rules open a scope that may span lines and carries its
//! own nested rules. Sibling order decides which rule wins when two
//! could start at the same offset.

use super::group::Group;
use super::pattern::Pattern;

/// A node in the rule tree
#[derive(Debug, Clone)]
pub enum Rule {
    Pattern(PatternRule),
    Region(RegionRule),
}

impl Rule {
    /// Group applied to text matched by this rule
    pub fn group(&self) -> &Group {
        match self {
            Rule::Pattern(rule) => rule.group(),
            Rule::Region(rule) => rule.group(),
        }
    }
}

impl From<PatternRule> for Rule {
    fn from(rule: PatternRule) -> Self {
        Rule::Pattern(rule)
    }
}

impl From<RegionRule> for Rule {
    fn from(rule: RegionRule) -> Self {
        Rule::Region(rule)
    }
}

/// A single-line pattern rule
///
/// Colors exactly the characters the pattern consumes.
#[derive(Debug, Clone)]
pub struct PatternRule {
    group: Group,
    pattern: Pattern,
}

impl PatternRule {
    pub fn new(group: Group, pattern: Pattern) -> Self {
        Self { group, pattern }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

/// A start/end delimited region (block comments, strings)
///
/// While open, only the region's own rules apply. The region stays open
/// across line breaks until its end pattern matches.
#[derive(Debug, Clone)]
pub struct RegionRule {
    group: Group,
    /// Group for the start and end delimiters, if different
    limit_group: Option<Group>,
    start: Pattern,
    end: Pattern,
    /// Text consumed inside the region that the end pattern must not
    /// match within (usually escapes)
    skip: Option<Pattern>,
    rules: Vec<Rule>,
}

impl RegionRule {
    pub fn new(group: Group, start: Pattern, end: Pattern) -> Self {
        Self {
            group,
            limit_group: None,
            start,
            end,
            skip: None,
            rules: Vec::new(),
        }
    }

    /// Builder: color the delimiters with their own group
    pub fn with_limit_group(mut self, group: Group) -> Self {
        self.limit_group = Some(group);
        self
    }

    /// Builder: set the skip pattern
    pub fn with_skip(mut self, skip: Pattern) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Builder: set the nested rules
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn limit_group(&self) -> Option<&Group> {
        self.limit_group.as_ref()
    }

    pub fn start(&self) -> &Pattern {
        &self.start
    }

    pub fn end(&self) -> &Pattern {
        &self.end
    }

    pub fn skip(&self) -> Option<&Pattern> {
        self.skip.as_ref()
    }

    /// Rules that apply while this region is open
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::group::GroupRegistry;

    #[test]
    fn test_pattern_rule() {
        let registry = GroupRegistry::new();
        let rule = PatternRule::new(registry.intern("constant.number"), Pattern::new(r"\d+").unwrap());

        assert_eq!(rule.group().name(), "constant.number");
        assert_eq!(rule.pattern().as_str(), r"\d+");
        let rule: Rule = rule.into();
        assert_eq!(rule.group().name(), "constant.number");
    }

    #[test]
    fn test_region_rule_builders() {
        let registry = GroupRegistry::new();
        let escape = PatternRule::new(registry.intern("constant.specialChar"), Pattern::new(r"\\.").unwrap());
        let region = RegionRule::new(
            registry.intern("constant.string"),
            Pattern::new("\"").unwrap(),
            Pattern::new("\"").unwrap(),
        )
        .with_skip(Pattern::new(r"\\.").unwrap())
        .with_limit_group(registry.intern("symbol.delim"))
        .with_rules(vec![escape.into()]);

        assert_eq!(region.group().name(), "constant.string");
        assert_eq!(region.limit_group().map(Group::name), Some("symbol.delim"));
        assert_eq!(region.skip().map(Pattern::as_str), Some(r"\\."));
        assert_eq!(region.rules().len(), 1);
        assert_eq!(region.rules()[0].group().name(), "constant.specialChar");
    }
}
