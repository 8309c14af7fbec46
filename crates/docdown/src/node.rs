//! Owned DOM tree used by every stage of the conversion pipeline.
//!
//! The parser adapter builds this structure once; the sanitizer, cleanup and
//! normalizer passes mutate it in place, and the converter walks it read-only.
//! Nodes own their children, so there are no parent pointers. Passes that need
//! to address a node from the outside use an index path from the root.

/// Node types matching DOM nodeType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
    /// Comment node (nodeType = 8)
    Comment = 8,
    /// Document node (nodeType = 9)
    Document = 9,
    /// Document fragment node (nodeType = 11)
    DocumentFragment = 11,
}

/// Index path from a root node down to one of its descendants.
pub type NodePath = Vec<usize>;

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `#text` for text nodes
    pub tag: String,

    /// Text payload for text and comment nodes
    pub value: Option<String>,

    /// Attributes in source order
    pub attributes: Vec<(String, String)>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            tag: tag_name.to_lowercase(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        node.attributes = attrs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            tag: "#text".to_string(),
            value: Some(content.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a document fragment node
    pub fn document_fragment() -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            tag: "#document-fragment".to_string(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style child insertion, handy for assembling trees in tests.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Tag name of an element (already lowercase)
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// True for an element with the given tag name
    pub fn is(&self, tag: &str) -> bool {
        self.is_element() && self.tag == tag
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_string();
            return;
        }
        self.attributes.push((name.to_lowercase(), value.to_string()));
    }

    /// Drop every attribute whose name is not in `keep`
    pub fn retain_attrs(&mut self, keep: &[&str]) {
        self.attributes.retain(|(k, _)| keep.contains(&k.as_str()));
    }

    /// Whether the whitespace-separated `class` attribute contains `class_name`
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class_name))
            .unwrap_or(false)
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Depth-first, document-order iterator over every descendant (not self)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Whether any descendant satisfies `pred`
    pub fn contains(&self, pred: impl Fn(&Node) -> bool) -> bool {
        self.descendants().any(pred)
    }

    /// First descendant element with the given tag, in document order
    pub fn find_tag(&self, tag: &str) -> Option<&Node> {
        self.descendants().find(|n| n.is(tag))
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::Text => out.push_str(self.value.as_deref().unwrap_or_default()),
            NodeType::Comment => {}
            _ => {
                for child in &self.children {
                    child.push_text(out);
                }
            }
        }
    }

    /// Resolve an index path relative to this node
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable variant of [`Node::node_at`]
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Detach the node at `path` and return it. An empty path takes the whole
    /// node, leaving an empty fragment behind.
    pub fn take_at(&mut self, path: &[usize]) -> Option<Node> {
        let Some((last, parent_path)) = path.split_last() else {
            return Some(std::mem::replace(self, Node::document_fragment()));
        };
        let parent = self.node_at_mut(parent_path)?;
        if *last < parent.children.len() {
            Some(parent.children.remove(*last))
        } else {
            None
        }
    }

    /// Reconstruct outer HTML
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => escape_html_text(self.value.as_deref().unwrap_or_default()),
            NodeType::Comment => String::new(),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();
                let open = if attrs.is_empty() {
                    format!("<{}>", tag)
                } else {
                    format!("<{} {}>", tag, attrs)
                };

                if crate::utilities::is_void(tag) {
                    open
                } else {
                    format!("{}{}</{}>", open, self.inner_html(), tag)
                }
            }
            _ => self.inner_html(),
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        self.children().map(Node::outer_html).collect()
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Iterator returned by [`Node::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    escape_html_text(s).replace('"', "&quot;")
}

/// A reference to a node with parent context.
/// This allows rules to look upward without storing parent pointers.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a Node>,
    /// Position among the parent's element children
    index: usize,
    in_pre: bool,
}

impl<'a> NodeRef<'a> {
    /// Create a new NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
            in_pre: false,
        }
    }

    /// Create a NodeRef for a child of `parent`
    pub(crate) fn child_of(node: &'a Node, parent: &NodeRef<'a>, index: usize) -> Self {
        Self {
            node,
            parent: Some(parent.node),
            index,
            in_pre: parent.in_pre || parent.node.is("pre"),
        }
    }

    /// The parent element, if known
    pub fn parent(&self) -> Option<&'a Node> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(Node::tag_name)
    }

    /// Zero-based position among the parent's element children
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether some ancestor is a `pre` element
    pub fn in_pre(&self) -> bool {
        self.in_pre
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let node = Node::element("DIV");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "div");
    }

    #[test]
    fn test_attributes() {
        let mut node = Node::element_with_attrs(
            "a",
            vec![("href", "https://example.com"), ("title", "Example")],
        );
        assert_eq!(node.attr("href"), Some("https://example.com"));
        assert_eq!(node.attr("TITLE"), Some("Example"));
        assert_eq!(node.attr("class"), None);

        node.set_attr("href", "/other");
        node.set_attr("data-x", "1");
        assert_eq!(node.attr("href"), Some("/other"));
        assert_eq!(node.attributes.len(), 3);

        node.retain_attrs(&["href"]);
        assert_eq!(node.attributes, vec![("href".to_string(), "/other".to_string())]);
    }

    #[test]
    fn test_has_class() {
        let node = Node::element_with_attrs("div", vec![("class", "docs  sidebar")]);
        assert!(node.has_class("sidebar"));
        assert!(!node.has_class("side"));
    }

    #[test]
    fn test_text_content() {
        let div = Node::element("div")
            .with_child(Node::text("Hello "))
            .with_child(Node::element("span").with_child(Node::text("World")));

        assert_eq!(div.text_content(), "Hello World");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = Node::element("div")
            .with_child(Node::element("p").with_child(Node::element("em")))
            .with_child(Node::element("ul"));

        let tags: Vec<&str> = root.descendants().map(|n| n.tag_name()).collect();
        assert_eq!(tags, vec!["p", "em", "ul"]);
    }

    #[test]
    fn test_paths() {
        let mut root = Node::element("body")
            .with_child(Node::element("nav"))
            .with_child(Node::element("main").with_child(Node::text("x")));

        assert_eq!(root.node_at(&[1, 0]).map(Node::text_content), Some("x".to_string()));
        assert!(root.node_at(&[5]).is_none());

        let main = root.take_at(&[1]).unwrap();
        assert!(main.is("main"));
        assert_eq!(root.children.len(), 1);

        let whole = root.take_at(&[]).unwrap();
        assert!(whole.is("body"));
    }

    #[test]
    fn test_outer_html() {
        let a = Node::element_with_attrs("a", vec![("href", "https://example.com")])
            .with_child(Node::text("a < b"));
        assert_eq!(a.outer_html(), "<a href=\"https://example.com\">a &lt; b</a>");

        let img = Node::element_with_attrs("img", vec![("src", "test.png"), ("alt", "Test")]);
        assert_eq!(img.outer_html(), "<img src=\"test.png\" alt=\"Test\">");
    }
}
