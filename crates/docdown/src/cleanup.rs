//! Element cleanup over the located content subtree.
//!
//! Empty wrappers are dropped so they cannot inject blank lines later, and
//! every remaining element loses the attributes no conversion rule reads.

use crate::node::Node;

/// Attributes the converter rules rely on
pub const PRESERVED_ATTRIBUTES: &[&str] = &["class", "href", "src", "alt", "title"];

/// Table cells are structural even when blank; the table rule pads them.
const KEEP_WHEN_BLANK: &[&str] = &["td", "th"];

/// Kept below a `pre`, where the code normalizer turns them into newlines
const KEEP_IN_PRE: &[&str] = &["br"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub removed: usize,
    pub stripped_attributes: usize,
}

/// Clean every descendant element of `root` in place. `root` keeps its own
/// attributes.
pub fn clean_elements(root: &mut Node) -> CleanupStats {
    let mut stats = CleanupStats::default();
    clean_children(root, root.is("pre"), &mut stats);
    stats
}

fn clean_children(node: &mut Node, in_pre: bool, stats: &mut CleanupStats) {
    let before = node.children.len();
    node.children
        .retain(|child| !child.is_element() || !is_removable(child, in_pre));
    stats.removed += before - node.children.len();

    for child in node.children.iter_mut().filter(|c| c.is_element()) {
        let attrs = child.attributes.len();
        child.retain_attrs(PRESERVED_ATTRIBUTES);
        stats.stripped_attributes += attrs - child.attributes.len();
        let child_in_pre = in_pre || child.is("pre");
        clean_children(child, child_in_pre, stats);
    }
}

/// Blank text and no image anywhere in (or at) the element
fn is_removable(node: &Node, in_pre: bool) -> bool {
    let tag = node.tag_name();
    if KEEP_WHEN_BLANK.contains(&tag) || tag == "img" || (in_pre && KEEP_IN_PRE.contains(&tag)) {
        return false;
    }
    node.text_content().trim().is_empty() && !node.contains(|n| n.is("img"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    fn body(html: &str) -> Node {
        parse_html(html).find_tag("body").cloned().unwrap()
    }

    #[test]
    fn test_removes_empty_wrappers() {
        let mut root = body("<div><p>Text</p><div><span> </span></div><p></p></div>");
        let stats = clean_elements(&mut root);
        assert_eq!(stats.removed, 2);
        assert_eq!(root.descendants().filter(|n| n.is("p")).count(), 1);
    }

    #[test]
    fn test_keeps_images_and_their_wrappers() {
        let mut root = body(r#"<figure><img src="a.png" alt="A"></figure><img src="b.png">"#);
        clean_elements(&mut root);
        assert!(root.find_tag("figure").is_some());
        assert_eq!(root.descendants().filter(|n| n.is("img")).count(), 2);
    }

    #[test]
    fn test_keeps_blank_table_cells() {
        let mut root = body("<table><tr><td>A</td><td></td></tr></table>");
        clean_elements(&mut root);
        assert_eq!(root.descendants().filter(|n| n.is("td")).count(), 2);
    }

    #[test]
    fn test_line_breaks_survive_only_inside_pre() {
        let mut root = body("<p>a<br>b</p><pre><code>x<br>y</code></pre>");
        let stats = clean_elements(&mut root);
        assert_eq!(stats.removed, 1);
        assert!(root.find_tag("p").unwrap().find_tag("br").is_none());
        assert!(root.find_tag("pre").unwrap().find_tag("br").is_some());
    }

    #[test]
    fn test_strips_unlisted_attributes() {
        let mut root = body(
            r#"<a href="/x" title="X" style="color:red" data-track="1" class="ref">x</a>"#,
        );
        let stats = clean_elements(&mut root);
        let a = root.find_tag("a").unwrap();
        assert_eq!(a.attr("href"), Some("/x"));
        assert_eq!(a.attr("title"), Some("X"));
        assert_eq!(a.attr("class"), Some("ref"));
        assert!(a.attr("style").is_none());
        assert!(a.attr("data-track").is_none());
        assert_eq!(stats.stripped_attributes, 2);
    }
}
