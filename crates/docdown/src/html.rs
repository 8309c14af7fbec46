//! Parser adapter.
//!
//! Parses an HTML string with `scraper` (html5ever) and copies the result into
//! the owned [`Node`] tree the rest of the pipeline mutates.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse a full HTML document into a Node tree rooted at `<html>`.
///
/// html5ever recovers from any malformed input, so this never fails; the
/// returned tree always contains a `body` element.
///
/// # Example
///
/// ```rust
/// use docdown::parse_html;
///
/// let root = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(root.tag_name(), "html");
/// assert!(root.find_tag("body").is_some());
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_document(html);
    copy_element(document.root_element())
}

/// Deep copy of an html5ever element into an owned [`Node`]. Comments,
/// doctypes and processing instructions have no Markdown form and are skipped.
fn copy_element(source: ElementRef) -> Node {
    let element = source.value();
    let mut node = Node::element_with_attrs(element.name(), element.attrs().collect());
    node.children = source
        .children()
        .filter_map(|child| match child.value() {
            ScraperNode::Text(text) => Some(Node::text(text)),
            ScraperNode::Element(_) => ElementRef::wrap(child).map(copy_element),
            _ => None,
        })
        .collect();
    node
}
