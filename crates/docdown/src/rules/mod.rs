//! Rule system for HTML to Markdown conversion.
//!
//! Rules are `(Filter, replacement)` pairs. Custom rules are consulted first,
//! in insertion order, then the CommonMark set; the first match wins.

mod commonmark;
mod documentation;
mod rule;

pub use commonmark::commonmark_rules;
pub use documentation::{documentation_rules, resolve_href};
pub use rule::{Filter, Rule, RuleContext};

use indexmap::IndexMap;

use crate::node::NodeRef;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// CommonMark rules only
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// CommonMark rules plus the documentation rules (code blocks, tables,
    /// links, definition lists) registered ahead of them
    pub fn for_documentation() -> Self {
        let mut rules = Self::new();
        for (key, rule) in documentation_rules() {
            rules.add(key, rule);
        }
        rules
    }

    /// Add a custom rule. Re-using a key replaces the rule but keeps its
    /// original priority.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Keys of the custom rules, in priority order
    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// Find the rule for a node
    pub fn for_node<'a>(&'a self, node: &NodeRef, ctx: &RuleContext) -> Option<&'a Rule> {
        let tag = node.tag_name();

        self.custom_rules
            .values()
            .chain(self.commonmark_rules.iter())
            .find(|rule| rule.filter.matches(tag, node, ctx))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::for_documentation()
    }
}
