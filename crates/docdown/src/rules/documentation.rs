//! Rules tuned for API documentation pages: fenced code blocks, pipe tables,
//! absolute links and definition lists. They are registered ahead of the
//! CommonMark rules.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::commonmark::longest_backtick_run;
use super::{Filter, Rule};
use crate::code::language_from_class;
use crate::node::Node;
use crate::utilities::collapse_whitespace;

static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("valid blank line regex"));

/// The documentation rules, keyed and in priority order
pub fn documentation_rules() -> Vec<(&'static str, Rule)> {
    vec![
        ("codeBlocks", code_block_rule()),
        ("tables", table_rule()),
        ("links", link_rule()),
        ("definitionList", definition_list_rule()),
        ("definitionTerm", definition_term_rule()),
        ("definitionDescription", definition_description_rule()),
    ]
}

/// `pre` blocks, and standalone `code` elements spanning several lines,
/// become fenced blocks.
pub fn code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| match tag {
            "pre" => !node.in_pre(),
            "code" => !node.in_pre() && node.text_content().trim().contains('\n'),
            _ => false,
        }),
        |node, _, ctx| {
            let language = detect_language(node.node).unwrap_or_default();
            let code = tidy_code(&node.text_content());

            // A fence must be longer than any backtick run inside the block
            let longest = longest_backtick_run(&code);
            let configured = &ctx.options.fence;
            let fence = if configured.starts_with('`') && longest >= configured.len() {
                "`".repeat(longest + 1)
            } else {
                configured.clone()
            };

            format!("\n{fence}{language}\n{code}\n{fence}\n")
        },
    )
}

/// Language of a code block: `language-*`/`lang-*` class or `data-language`
/// on the element, then on its `code` child.
fn detect_language(node: &Node) -> Option<String> {
    let own = |n: &Node| {
        n.attr("class")
            .and_then(language_from_class)
            .or_else(|| n.attr("data-language").map(str::trim).filter(|l| !l.is_empty()))
            .map(str::to_string)
    };

    own(node).or_else(|| node.element_children().filter(|c| c.is("code")).find_map(own))
}

/// Trim the block, drop leading/trailing blank lines and collapse internal
/// runs of blank lines to a single one.
fn tidy_code(text: &str) -> String {
    let trimmed = text.trim().trim_matches('\n');
    BLANK_LINE_RUNS.replace_all(trimmed, "\n\n").into_owned()
}

/// Tables become pipe tables with a centered alignment row.
pub fn table_rule() -> Rule {
    Rule::for_tag("table", |node, content, _| {
        let rows = table_rows(node.node);
        if rows.is_empty() {
            return content.to_string();
        }

        let (headers, body): (Vec<String>, Vec<&Node>) = match header_row(node.node, &rows) {
            Some(header) => (
                cells(header),
                rows.iter().copied().filter(|r| !std::ptr::eq(*r, header)).collect(),
            ),
            None => {
                let width = rows.iter().map(|r| cells(r).len()).max().unwrap_or(0);
                (
                    (1..=width).map(|i| format!("Column {i}")).collect(),
                    rows.clone(),
                )
            }
        };
        if headers.is_empty() {
            return content.to_string();
        }

        let mut markdown = String::from("\n");
        markdown.push_str(&pipe_row(&headers));
        markdown.push_str(&pipe_row(&vec![":---:".to_string(); headers.len()]));

        for row in body {
            let mut row_cells = cells(row);
            if row_cells.is_empty() {
                continue;
            }
            while row_cells.len() < headers.len() {
                row_cells.push(" ".to_string());
            }
            markdown.push_str(&pipe_row(&row_cells));
        }

        markdown.push('\n');
        markdown
    })
}

/// Rows belonging to `table` itself (nested tables excluded), in order
fn table_rows(table: &Node) -> Vec<&Node> {
    let mut rows = Vec::new();
    for child in table.element_children() {
        match child.tag_name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child.element_children().filter(|r| r.is("tr")))
            }
            _ => {}
        }
    }
    rows
}

/// First `thead` row, else the first row when it carries `th` cells
fn header_row<'a>(table: &'a Node, rows: &[&'a Node]) -> Option<&'a Node> {
    let from_thead = table
        .element_children()
        .filter(|c| c.is("thead"))
        .flat_map(|thead| thead.element_children())
        .find(|r| r.is("tr") && !cells(r).is_empty());

    from_thead.or_else(|| {
        rows.first()
            .copied()
            .filter(|r| r.element_children().any(|c| c.is("th")))
    })
}

/// Cell texts of a row: trimmed, whitespace-collapsed, pipes escaped, and a
/// single space for empty cells
fn cells(row: &Node) -> Vec<String> {
    row.element_children()
        .filter(|c| c.is("td") || c.is("th"))
        .map(|cell| {
            let text = collapse_whitespace(cell.text_content().trim()).replace('|', "\\|");
            if text.is_empty() {
                " ".to_string()
            } else {
                text
            }
        })
        .collect()
}

fn pipe_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// Links resolve against the page URL; a link without `href` keeps only
/// its label.
pub fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, ctx| {
        let href = node.attr("href").unwrap_or("").trim();
        if href.is_empty() {
            return content.to_string();
        }

        let href = resolve_href(href, ctx.base_url);
        let title_part = node
            .attr("title")
            .filter(|t| !t.trim().is_empty())
            .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
            .unwrap_or_default();

        format!("[{}]({}{})", content, href, title_part)
    })
}

/// Resolve `href` against `base`. Absolute `http(s)` links and anything that
/// fails to resolve are returned unchanged.
pub fn resolve_href(href: &str, base: Option<&Url>) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.to_string(),
        Some(Err(error)) => {
            tracing::debug!(href, %error, "leaving unresolvable link as-is");
            href.to_string()
        }
        None => href.to_string(),
    }
}

pub fn definition_list_rule() -> Rule {
    Rule::for_tag("dl", |_, content, _| format!("\n{}\n", content))
}

pub fn definition_term_rule() -> Rule {
    Rule::for_tag("dt", |_, content, _| {
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }
        format!("\n**{}**\n", content)
    })
}

pub fn definition_description_rule() -> Rule {
    Rule::for_tag("dd", |_, content, _| format!("{}\n", content.trim()))
}
