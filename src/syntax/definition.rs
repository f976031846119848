//! Compiled syntax definitions
//!
//! This module turns a parsed [`DefinitionSource`] into a [`Definition`]:
//! a header plus an ordered tree of compiled rules. Every pattern is
//! compiled and every group interned here, so a definition that builds
//! successfully can never fail while highlighting.

use tracing::debug;

use super::group::GroupRegistry;
use super::header::Header;
use super::pattern::{MatchBudget, Pattern};
use super::rules::{PatternRule, RegionRule, Rule};
use super::source::{DefinitionSource, RuleSource};
use crate::error::{Error, Result};

/// A complete syntax definition
#[derive(Debug, Clone)]
pub struct Definition {
    header: Header,
    rules: Vec<Rule>,
}

impl Definition {
    /// Assemble a definition from already compiled parts
    pub fn new(header: Header, rules: Vec<Rule>) -> Self {
        Self { header, rules }
    }

    /// Compile a parsed definition with the default match budget
    pub fn from_source(source: &DefinitionSource, registry: &GroupRegistry) -> Result<Self> {
        Self::from_source_with(source, registry, MatchBudget::default())
    }

    /// Compile a parsed definition
    pub fn from_source_with(
        source: &DefinitionSource,
        registry: &GroupRegistry,
        budget: MatchBudget,
    ) -> Result<Self> {
        let header = Header::from_source(source)?;
        let builder = Builder {
            filetype: &source.filetype,
            registry,
            budget,
        };
        let rules = builder.rules(&source.rules)?;
        debug!(filetype = %source.filetype, rules = rules.len(), "compiled definition");
        Ok(Self { header, rules })
    }

    /// Parse and compile TOML text
    pub fn from_toml(text: &str, registry: &GroupRegistry) -> Result<Self> {
        Self::from_source(&DefinitionSource::from_toml(text)?, registry)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn filetype(&self) -> &str {
        self.header.filetype()
    }

    /// Top-level rules in declaration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Resolve a path of rule indices to the innermost region it names.
    ///
    /// The first index selects from the top-level rules, each following
    /// index from the previous region's nested rules. Returns `None` for
    /// the empty path or any index that does not name a region.
    pub fn region_at(&self, path: &[usize]) -> Option<&RegionRule> {
        let (&first, rest) = path.split_first()?;
        let mut region = as_region(self.rules.get(first)?)?;
        for &idx in rest {
            region = as_region(region.rules().get(idx)?)?;
        }
        Some(region)
    }
}

fn as_region(rule: &Rule) -> Option<&RegionRule> {
    match rule {
        Rule::Region(region) => Some(region),
        Rule::Pattern(_) => None,
    }
}

struct Builder<'a> {
    filetype: &'a str,
    registry: &'a GroupRegistry,
    budget: MatchBudget,
}

/// A rule whose shape has been checked and whose patterns compiled, with
/// its groups not yet interned
enum Staged<'s> {
    Pattern {
        source: &'s RuleSource,
        pattern: Pattern,
    },
    Region {
        source: &'s RuleSource,
        start: Pattern,
        end: Pattern,
        skip: Option<Pattern>,
        rules: Vec<Staged<'s>>,
    },
}

impl Builder<'_> {
    /// Build the rule tree. Groups are interned only once the whole tree
    /// is known to be valid.
    fn rules(&self, sources: &[RuleSource]) -> Result<Vec<Rule>> {
        let staged = self.stage_all(sources)?;
        Ok(staged.into_iter().map(|rule| self.finish(rule)).collect())
    }

    fn stage_all<'s>(&self, sources: &'s [RuleSource]) -> Result<Vec<Staged<'s>>> {
        sources.iter().map(|source| self.stage(source)).collect()
    }

    fn stage<'s>(&self, source: &'s RuleSource) -> Result<Staged<'s>> {
        if !source.is_region() {
            let pattern = source
                .pattern
                .as_deref()
                .ok_or_else(|| self.malformed(source, "rule needs a pattern or a start and end"))?;
            if !source.rules.is_empty() || source.skip.is_some() || source.limit_group.is_some() {
                return Err(self.malformed(source, "pattern rule cannot carry region fields"));
            }
            return Ok(Staged::Pattern {
                source,
                pattern: self.pattern(pattern)?,
            });
        }

        if source.pattern.is_some() {
            return Err(self.malformed(source, "rule cannot have both a pattern and a region"));
        }
        let start = source
            .start
            .as_deref()
            .ok_or_else(|| self.malformed(source, "region is missing a start pattern"))?;
        let end = source
            .end
            .as_deref()
            .ok_or_else(|| self.malformed(source, "region is missing an end pattern"))?;

        Ok(Staged::Region {
            source,
            start: self.pattern(start)?,
            end: self.pattern(end)?,
            skip: source.skip.as_deref().map(|skip| self.pattern(skip)).transpose()?,
            rules: self.stage_all(&source.rules)?,
        })
    }

    fn finish(&self, staged: Staged<'_>) -> Rule {
        match staged {
            Staged::Pattern { source, pattern } => {
                PatternRule::new(self.registry.intern(&source.group), pattern).into()
            }
            Staged::Region {
                source,
                start,
                end,
                skip,
                rules,
            } => {
                let group = self.registry.intern(&source.group);
                let mut region = RegionRule::new(group, start, end)
                    .with_rules(rules.into_iter().map(|rule| self.finish(rule)).collect());
                if let Some(skip) = skip {
                    region = region.with_skip(skip);
                }
                if let Some(limit) = source.limit_group.as_deref() {
                    region = region.with_limit_group(self.registry.intern(limit));
                }
                region.into()
            }
        }
    }

    fn pattern(&self, source: &str) -> Result<Pattern> {
        Pattern::with_budget(source, self.budget)
    }

    fn malformed(&self, source: &RuleSource, reason: &'static str) -> Error {
        Error::Malformed {
            filetype: self.filetype.to_string(),
            group: source.group.clone(),
            reason,
        }
    }
}
