//! Content locator: picks the subtree that holds the page's documentation.
//!
//! Selection is a pure function of the (sanitized) tree. It returns an index
//! path instead of a reference so callers can detach the winning subtree.

use std::fmt;

use crate::node::{Node, NodePath};
use crate::utilities::trimmed_len;

/// Candidates must have strictly more trimmed characters than this.
pub const MIN_CANDIDATE_LEN: usize = 100;

/// A simple selector understood by the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSelector {
    /// `main`
    Tag(&'static str),
    /// `.content`
    Class(&'static str),
    /// `#main-content`
    Id(&'static str),
    /// `[role="main"]`
    Role(&'static str),
}

impl ContentSelector {
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        match self {
            ContentSelector::Tag(tag) => node.tag_name() == *tag,
            ContentSelector::Class(class) => node.has_class(class),
            ContentSelector::Id(id) => node.attr("id") == Some(*id),
            ContentSelector::Role(role) => node.attr("role") == Some(*role),
        }
    }
}

impl fmt::Display for ContentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSelector::Tag(tag) => write!(f, "{tag}"),
            ContentSelector::Class(class) => write!(f, ".{class}"),
            ContentSelector::Id(id) => write!(f, "#{id}"),
            ContentSelector::Role(role) => write!(f, "[role=\"{role}\"]"),
        }
    }
}

/// Selectors tried in priority order. Documentation generators commonly use
/// one of these for their main column.
pub const CONTENT_SELECTORS: &[ContentSelector] = &[
    ContentSelector::Tag("main"),
    ContentSelector::Tag("article"),
    ContentSelector::Class("content"),
    ContentSelector::Class("documentation"),
    ContentSelector::Class("docs-content"),
    ContentSelector::Class("api-content"),
    ContentSelector::Id("main-content"),
    ContentSelector::Class("markdown-body"),
    ContentSelector::Class("readme"),
    ContentSelector::Class("api-docs"),
    ContentSelector::Role("main"),
    ContentSelector::Role("article"),
    ContentSelector::Class("main-content"),
    ContentSelector::Id("docs-content"),
];

/// How the winning candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Selector(ContentSelector),
    LargestDiv,
    Body,
}

/// The subtree chosen as main content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCandidate {
    /// Index path from the document root
    pub path: NodePath,
    /// Trimmed text length in characters
    pub text_len: usize,
    pub source: CandidateSource,
}

/// Find the main content of a sanitized document.
///
/// Each selector contributes only its first match in document order; the
/// first such match with enough text wins. Otherwise the largest `div` under
/// `body` is used (earliest wins on ties), and failing that `body` itself, or
/// the root when the tree has no `body`.
pub fn locate_content(root: &Node) -> ContentCandidate {
    for selector in CONTENT_SELECTORS {
        if let Some(path) = find_first(root, &|n| selector.matches(n)) {
            let text_len = text_len_at(root, &path);
            if text_len > MIN_CANDIDATE_LEN {
                return ContentCandidate {
                    path,
                    text_len,
                    source: CandidateSource::Selector(*selector),
                };
            }
        }
    }

    let body_path = find_first(root, &|n| n.is("body"));

    if let Some(body_path) = &body_path {
        if let Some(candidate) = largest_div(root, body_path) {
            return candidate;
        }
    }

    let path = body_path.unwrap_or_default();
    ContentCandidate {
        text_len: text_len_at(root, &path),
        path,
        source: CandidateSource::Body,
    }
}

/// Largest `div` strictly below `body_path` whose text exceeds the minimum
fn largest_div(root: &Node, body_path: &[usize]) -> Option<ContentCandidate> {
    let body = root.node_at(body_path)?;
    let mut best: Option<ContentCandidate> = None;
    let mut path = body_path.to_vec();

    visit(body, &mut path, &mut |node, path| {
        if !node.is("div") {
            return;
        }
        let text_len = trimmed_len(&node.text_content());
        let current = best.as_ref().map(|c| c.text_len).unwrap_or(MIN_CANDIDATE_LEN);
        if text_len > current {
            best = Some(ContentCandidate {
                path: path.to_vec(),
                text_len,
                source: CandidateSource::LargestDiv,
            });
        }
    });

    best
}

fn text_len_at(root: &Node, path: &[usize]) -> usize {
    root.node_at(path)
        .map(|node| trimmed_len(&node.text_content()))
        .unwrap_or(0)
}

/// Path of the first descendant (document order, including `root`) matching `pred`
fn find_first(root: &Node, pred: &dyn Fn(&Node) -> bool) -> Option<NodePath> {
    if pred(root) {
        return Some(Vec::new());
    }
    for (index, child) in root.children.iter().enumerate() {
        if let Some(mut path) = find_first(child, pred) {
            path.insert(0, index);
            return Some(path);
        }
    }
    None
}

/// Pre-order walk over the descendants of `node`, passing each one's path
fn visit(node: &Node, path: &mut NodePath, f: &mut dyn FnMut(&Node, &[usize])) {
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        f(child, path);
        visit(child, path, f);
        path.pop();
    }
}
