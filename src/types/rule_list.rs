use std::fmt;

use super::rule::{Rule, RuleBuilder};

/// Builder for constructing a [`RuleList`].
///
/// Rules keep the order in which they are added; that order is their
/// priority.
///
/// # Example
///
/// ```
/// use personalize::{RuleListBuilder, field, hide, set_rendering, visit};
///
/// let rules = RuleListBuilder::new()
///     .named("hero personalization")
///     .rule("bots", |r| r.when(field("request.bot").eq(true)).then(hide()))
///     .rule("returning", |r| {
///         r.when(visit("pages").gte(3_i64))
///             .then(set_rendering("hero-returning"))
///     })
///     .build();
///
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RuleListBuilder {
    name: Option<String>,
    rules: Vec<Rule>,
}

impl RuleListBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the list. The name identifies it in diagnostics.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Define a rule. The closure normally calls `.when(..)` and one or more
    /// `.then(..)`; a rule left without a condition is kept but never fires.
    #[must_use]
    pub fn rule(mut self, name: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.rules.push(f(Rule::builder().named(name)).build());
        self
    }

    /// Append an already-built rule.
    #[must_use]
    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn build(self) -> RuleList {
        RuleList {
            name: self.name,
            rules: self.rules,
        }
    }
}

/// An ordered, immutable list of rules. `Send + Sync`; share it behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    pub(crate) name: Option<String>,
    pub(crate) rules: Vec<Rule>,
}

impl RuleList {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Same rules under a different diagnostic name.
    #[must_use]
    pub fn renamed(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleList {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            name: None,
            rules: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleList({}, {} rules)",
            self.name.as_deref().unwrap_or("unnamed"),
            self.rules.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field, hide, set_rendering};

    #[test]
    fn builder_keeps_insertion_order() {
        let list = RuleListBuilder::new()
            .rule("first", |r| r.when(field("a").eq(1_i64)).then(hide()))
            .rule("second", |r| r.when(field("b").eq(2_i64)).then(set_rendering("x")))
            .rule("third", |r| r)
            .build();

        let names: Vec<_> = list.iter().filter_map(Rule::name).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert!(list.rules()[2].condition().is_none());
    }

    #[test]
    fn display_and_rename() {
        let list = RuleListBuilder::new().rule("r", |r| r).build();
        assert_eq!(list.to_string(), "RuleList(unnamed, 1 rules)");
        let list = list.renamed("hero");
        assert_eq!(list.name(), Some("hero"));
        assert_eq!(list.to_string(), "RuleList(hero, 1 rules)");
    }

    #[test]
    fn collect_from_rules() {
        let list: RuleList = (0..3)
            .map(|i| Rule::builder().named(&format!("r{i}")).build())
            .collect();
        assert_eq!(list.len(), 3);
        assert!(list.name().is_none());
    }

    #[test]
    fn empty_list() {
        let list = RuleListBuilder::new().build();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
