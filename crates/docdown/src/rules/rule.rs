//! Conversion rules: a [`Filter`] that claims elements and a replacement that
//! turns the element's converted children into Markdown.

use url::Url;

use crate::node::NodeRef;
use crate::service::ConvertOptions;

/// What a rule sees besides the node: the converter options and the page
/// URL relative links resolve against.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub options: &'a ConvertOptions,
    pub base_url: Option<&'a Url>,
}

/// `(node, converted children, context) -> Markdown fragment`
pub type ReplacementFn = Box<dyn Fn(&NodeRef, &str, &RuleContext) -> String + Send + Sync>;

/// Which elements a rule claims
pub enum Filter {
    TagName(String),
    TagNames(Vec<String>),
    /// Tag name, node and context in; decides on anything else
    Predicate(Box<dyn Fn(&str, &NodeRef, &RuleContext) -> bool + Send + Sync>),
}

impl Filter {
    /// Claim one tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Claim any of `names`
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RuleContext) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    pub fn matches(&self, tag: &str, node: &NodeRef, ctx: &RuleContext) -> bool {
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, ctx),
        }
    }
}

/// A filter plus the replacement applied to every element it claims
pub struct Rule {
    pub filter: Filter,
    pub replacement: ReplacementFn,
}

impl Rule {
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleContext) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Rule for one tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleContext) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Rule for several tags sharing one replacement
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleContext) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    pub fn replace(&self, node: &NodeRef, content: &str, ctx: &RuleContext) -> String {
        (self.replacement)(node, content, ctx)
    }
}
