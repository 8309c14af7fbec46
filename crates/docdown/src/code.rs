//! Code block normalizer for `pre > code` pairs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Node, NodeType};

static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:language|lang)-(\w+)").expect("valid language class regex"));

/// Language token from a `language-<token>` or `lang-<token>` class
pub fn language_from_class(class: &str) -> Option<&str> {
    LANGUAGE_CLASS
        .captures(class)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Normalize every `pre > code` pair under `root`. Returns the number of
/// code blocks touched.
///
/// The code element's markup (highlighter spans and the like) is flattened
/// into a single text node, so tags embedded in code can never be read back
/// as document structure. A detected language is copied onto the `pre` as
/// `language-<token>`.
pub fn normalize_code_blocks(root: &mut Node) -> usize {
    let mut count = 0;

    if root.is("pre") {
        let mut language = None;
        for code in root.children.iter_mut().filter(|c| c.is("code")) {
            if language.is_none() {
                language = code.attr("class").and_then(language_from_class).map(str::to_string);
            }
            let text = code_text(code);
            code.children = vec![Node::text(&text)];
            count += 1;
        }
        if let Some(language) = language {
            root.set_attr("class", &format!("language-{language}"));
        }
        return count;
    }

    for child in root.children.iter_mut().filter(|c| c.is_element()) {
        count += normalize_code_blocks(child);
    }
    count
}

/// Literal text of a code element; `<br>` counts as a line break
fn code_text(node: &Node) -> String {
    let mut out = String::new();
    push_code_text(node, &mut out);
    out
}

fn push_code_text(node: &Node, out: &mut String) {
    match node.node_type {
        NodeType::Text => out.push_str(node.value.as_deref().unwrap_or_default()),
        NodeType::Element if node.is("br") => out.push('\n'),
        _ => {
            for child in node.children() {
                push_code_text(child, out);
            }
        }
    }
}
