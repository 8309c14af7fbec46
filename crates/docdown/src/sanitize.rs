//! Markup sanitizer: prunes scripts, chrome and advertising before any
//! content detection runs.

use crate::node::Node;

/// Tags removed wherever they appear
pub const REMOVED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "iframe"];

/// Classes that mark navigation, ads and banners
pub const REMOVED_CLASSES: &[&str] = &["navigation", "sidebar", "menu", "ads", "cookie-banner"];

/// Element ids that mark banners
pub const REMOVED_IDS: &[&str] = &["cookie-banner"];

/// Whether an element belongs to the removal set
pub fn is_boilerplate(node: &Node) -> bool {
    if !node.is_element() {
        return false;
    }
    REMOVED_TAGS.contains(&node.tag_name())
        || REMOVED_CLASSES.iter().any(|class| node.has_class(class))
        || node
            .attr("id")
            .map(|id| REMOVED_IDS.contains(&id))
            .unwrap_or(false)
}

/// Remove every boilerplate subtree below `root`, in place.
///
/// Returns the number of subtrees removed. `root` itself is never removed.
pub fn sanitize(root: &mut Node) -> usize {
    let before = root.children.len();
    root.children.retain(|child| !is_boilerplate(child));
    let mut removed = before - root.children.len();

    for child in root.children.iter_mut() {
        removed += sanitize(child);
    }

    removed
}
