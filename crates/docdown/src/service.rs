//! DocumentConverter - the main entry point for page to Markdown conversion.

use url::Url;

use crate::cleanup::clean_elements;
use crate::code::normalize_code_blocks;
use crate::html::parse_html;
use crate::locate::locate_content;
use crate::node::{Node, NodeRef, NodeType};
use crate::postprocess;
use crate::rules::{Rule, RuleContext, Rules};
use crate::sanitize::sanitize;
use crate::tables::normalize_tables;
use crate::utilities::{collapse_whitespace, escape_markdown, is_block};
use crate::{DocdownError, Result};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
}

/// Options for DocumentConverter
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Output shorter than this many characters is rejected as a failed
    /// extraction
    pub min_content_length: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "* * *".to_string(),
            bullet_list_marker: '-',
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            min_content_length: 100,
        }
    }
}

/// Converts documentation pages to Markdown.
///
/// A converter holds only options and rules, so one instance can serve any
/// number of conversions; every call works on its own tree.
pub struct DocumentConverter {
    options: ConvertOptions,
    rules: Rules,
}

impl DocumentConverter {
    /// Create a new DocumentConverter with default options
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Create a DocumentConverter with custom options
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            rules: Rules::for_documentation(),
        }
    }

    /// Add a custom rule, checked before the built-in ones
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a full HTML page fetched from `base_url` to Markdown.
    pub fn convert(&self, html: &str, base_url: &str) -> Result<String> {
        let base = parse_base_url(base_url)?;
        let _span = tracing::debug_span!("convert", base_url = %base).entered();

        let root = parse_html(html);
        self.convert_document(root, Some(&base))
    }

    /// Run the pipeline on an already parsed document tree.
    pub fn convert_document(&self, mut root: Node, base_url: Option<&Url>) -> Result<String> {
        let removed = sanitize(&mut root);
        tracing::debug!(removed, "sanitized document");

        let candidate = locate_content(&root);
        tracing::debug!(
            source = ?candidate.source,
            text_len = candidate.text_len,
            "located main content"
        );
        let mut content = root.take_at(&candidate.path).unwrap_or(root);

        let stats = clean_elements(&mut content);
        let tables = normalize_tables(&mut content);
        let code_blocks = normalize_code_blocks(&mut content);
        tracing::debug!(
            removed = stats.removed,
            stripped_attributes = stats.stripped_attributes,
            tables,
            code_blocks,
            "normalized content"
        );
        tracing::trace!(html = %content.outer_html(), "content ready for conversion");

        let markdown = self.render(&content, base_url);
        let markdown = postprocess::run(&markdown);
        self.validate(markdown)
    }

    /// Structural conversion of a subtree, without cleanup or post-processing.
    pub fn render(&self, node: &Node, base_url: Option<&Url>) -> String {
        let ctx = RuleContext {
            options: &self.options,
            base_url,
        };
        self.process_node(&NodeRef::new(node), &ctx)
    }

    fn validate(&self, markdown: String) -> Result<String> {
        if markdown.trim().is_empty() {
            tracing::warn!("conversion produced no content");
            return Err(DocdownError::EmptyExtraction);
        }

        let length = markdown.chars().count();
        if length < self.options.min_content_length {
            tracing::warn!(
                length,
                minimum = self.options.min_content_length,
                "extracted content too short"
            );
            return Err(DocdownError::InsufficientExtraction { length });
        }

        Ok(markdown)
    }

    fn process_node(&self, node: &NodeRef, ctx: &RuleContext) -> String {
        match node.node.node_type {
            NodeType::Element => self.process_element(node, ctx),
            NodeType::Text => escape_markdown(&collapse_whitespace(
                node.node.value.as_deref().unwrap_or_default(),
            )),
            NodeType::Comment => String::new(),
            NodeType::Document | NodeType::DocumentFragment => self.process_children(node, ctx),
        }
    }

    /// Process a single element
    fn process_element(&self, element: &NodeRef, ctx: &RuleContext) -> String {
        let content = self.process_children(element, ctx);

        if let Some(rule) = self.rules.for_node(element, ctx) {
            return rule.replace(element, &content, ctx);
        }

        if is_block(element.tag_name()) {
            format!("\n\n{}\n\n", content)
        } else {
            content
        }
    }

    /// Process children of a node
    fn process_children(&self, parent: &NodeRef, ctx: &RuleContext) -> String {
        let children = &parent.node.children;
        let in_pre = parent.in_pre() || parent.node.is("pre");
        let parent_is_block = !parent.node.is_element() || is_block(parent.tag_name());

        let mut result = String::new();
        let mut element_index = 0;

        for (i, child) in children.iter().enumerate() {
            match child.node_type {
                NodeType::Text => {
                    let text = child.value.as_deref().unwrap_or_default();
                    if in_pre {
                        result.push_str(text);
                        continue;
                    }

                    // Whitespace next to block boundaries carries no meaning
                    let after_block = i
                        .checked_sub(1)
                        .map(|p| is_block_element(&children[p]))
                        .unwrap_or(parent_is_block);
                    let before_block = children
                        .get(i + 1)
                        .map(is_block_element)
                        .unwrap_or(parent_is_block);

                    let collapsed = collapse_whitespace(text);
                    let mut trimmed = collapsed.as_str();
                    if after_block {
                        trimmed = trimmed.trim_start();
                    }
                    if before_block {
                        trimmed = trimmed.trim_end();
                    }
                    if !trimmed.is_empty() {
                        result.push_str(&escape_markdown(trimmed));
                    }
                }
                NodeType::Element => {
                    let child_ref = NodeRef::child_of(child, parent, element_index);
                    element_index += 1;
                    result.push_str(&self.process_element(&child_ref, ctx));
                }
                _ => {}
            }
        }

        result
    }
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_block_element(node: &Node) -> bool {
    node.is_element() && is_block(node.tag_name())
}

/// Parse the page URL; only http and https pages are accepted
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DocdownError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render_html(html: &str) -> String {
        let root = parse_html(html);
        let body = root.find_tag("body").unwrap();
        let base = Url::parse("https://example.com/docs/").unwrap();
        let converter = DocumentConverter::new();
        postprocess::run(&converter.render(body, Some(&base)))
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(render_html("<p>Hello World</p>"), "Hello World");
    }

    #[test]
    fn test_heading_atx_by_default() {
        assert_eq!(render_html("<h1>Title</h1>"), "# Title");
    }

    #[test]
    fn test_heading_setext() {
        let options = ConvertOptions {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let converter = DocumentConverter::with_options(options);
        let h1 = Node::element("h1").with_child(Node::text("Title"));
        assert_eq!(converter.render(&h1, None).trim(), "Title\n=====");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            render_html("<p>Hello <strong>bold</strong> and <em>soft</em> <code>x_y</code></p>"),
            "Hello **bold** and _soft_ `x_y`"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(render_html("<p>snake_case *ptr</p>"), "snake\\_case \\*ptr");
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        assert_eq!(
            render_html("<div>\n  <p>One</p>\n  <p>Two</p>\n</div>"),
            "One\n\nTwo"
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            render_html("<ul>\n<li>One</li>\n<li>Two</li>\n</ul>"),
            "-   One\n-   Two"
        );
    }

    #[test]
    fn test_ordered_list_numbers_and_start() {
        assert_eq!(
            render_html(r#"<ol start="3"><li>One</li><li>Two</li></ol>"#),
            "3.  One\n4.  Two"
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            render_html("<ul><li>Parent<ul><li>Child</li></ul></li><li>Next</li></ul>"),
            "-   Parent\n    -   Child\n-   Next"
        );
    }

    #[test]
    fn test_blockquote_and_hr() {
        assert_eq!(
            render_html("<blockquote><p>Quote</p></blockquote><hr>"),
            "> Quote\n\n* * *"
        );
    }

    #[test]
    fn test_pre_text_is_not_escaped() {
        assert_eq!(
            render_html("<pre><code>let _x = a * b;</code></pre>"),
            "```\nlet _x = a * b;\n```"
        );
    }

    #[test]
    fn test_multiline_code_outside_pre_is_fenced() {
        assert_eq!(
            render_html("<p>Run:</p><code>make\nmake install</code>"),
            "Run:\n\n```\nmake\nmake install\n```"
        );
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            render_html(
                "<dl><dt>id</dt><dd>The identifier.</dd><dt>name</dt><dd>Display name.</dd></dl>"
            ),
            "**id**\nThe identifier.\n\n**name**\nDisplay name."
        );
    }

    #[test]
    fn test_custom_rule_overrides_builtin() {
        let mut converter = DocumentConverter::new();
        converter.add_rule("kbd", Rule::for_tag("kbd", |_, c, _| format!("<kbd>{}</kbd>", c)));
        let kbd = Node::element("kbd").with_child(Node::text("Ctrl"));
        assert_eq!(converter.render(&kbd, None), "<kbd>Ctrl</kbd>");
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("https://example.com/docs").is_ok());
        assert!(matches!(
            parse_base_url("ftp://example.com/"),
            Err(DocdownError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(DocdownError::InvalidBaseUrl(_))
        ));
    }
}
