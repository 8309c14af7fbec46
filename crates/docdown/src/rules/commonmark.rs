//! CommonMark rules: the generic fallback for everything the documentation
//! rules do not claim.

use super::{Filter, Rule};
use crate::service::HeadingStyle;
use crate::utilities::{clean_attribute, repeat};

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        horizontal_rule(),
        emphasis_rule(),
        strong_rule(),
        code_span_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content.trim()))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| "  \n".to_string())
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, ctx| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }

        match ctx.options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    repeat(underline, content.chars().count())
                )
            }
            _ => format!("\n\n{} {}\n\n", repeat("#", level), content),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        let content = content.trim_end();

        if node.parent_tag() == Some("li") {
            // Nested lists hang off the parent item without a blank line
            format!("\n{}", content.trim_start_matches('\n'))
        } else {
            format!("\n\n{}\n\n", content.trim_start_matches('\n'))
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, ctx| {
        let content = content
            .trim_start_matches('\n')
            .trim_end()
            .replace('\n', "\n    ");

        let prefix = match node.parent() {
            Some(parent) if parent.is("ol") => {
                let start: usize = parent
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                let position = parent
                    .element_children()
                    .take(node.index())
                    .filter(|c| c.is("li"))
                    .count();
                format!("{}.  ", start + position)
            }
            _ => format!("{}   ", ctx.options.bullet_list_marker),
        };

        format!("{}{}\n", prefix, content.trim_start())
    })
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, ctx| format!("\n\n{}\n\n", ctx.options.hr))
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, ctx| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = ctx.options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, ctx| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = &ctx.options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

/// Inline `code` outside of `pre`
fn code_span_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "code" && !node.in_pre()),
        |node, _, _| {
            let content = node.text_content();
            if content.is_empty() {
                return String::new();
            }

            let longest_run = longest_backtick_run(&content);
            let backticks = "`".repeat(longest_run + 1);

            let needs_space = content.starts_with('`') || content.ends_with('`');
            if needs_space {
                format!("{} {} {}", backticks, content, backticks)
            } else {
                format!("{}{}{}", backticks, content, backticks)
            }
        },
    )
}

/// Length of the longest run of consecutive backticks in `s`
pub(crate) fn longest_backtick_run(s: &str) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), c| {
            if c == '`' {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        let title = node.attr("title").filter(|t| !t.trim().is_empty());

        if src.is_empty() {
            return String::new();
        }

        let title_part = title.map(|t| format!(" \"{}\"", t)).unwrap_or_default();

        format!("![{}]({}{})", alt, src, title_part)
    })
}
