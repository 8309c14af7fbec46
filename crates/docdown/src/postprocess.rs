//! Text-level normalization of the converted Markdown.
//!
//! Each pass is an independent `&str -> String` rewrite. [`PASSES`] fixes the
//! order: the fence fix runs between the two blank-line collapses so that it
//! can never leave a triple newline behind.

use once_cell::sync::Lazy;
use regex::Regex;

static THREE_OR_MORE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

static ADJACENT_LINKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\[[^\]]*\]\([^)]*\))\s*\n\s*(\[[^\]]*\]\([^)]*\))")
        .expect("valid adjacent link regex")
});

static TABLE_ROW_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*\n\s*\|").expect("valid table row regex"));

/// A named text rewrite
pub type Pass = (&'static str, fn(&str) -> String);

/// All passes, in the order they run
pub const PASSES: &[Pass] = &[
    ("collapse_blank_lines", collapse_blank_lines),
    ("tighten_code_fences", tighten_code_fences),
    ("collapse_triple_newlines", collapse_triple_newlines),
    ("join_adjacent_links", join_adjacent_links),
    ("tighten_table_rows", tighten_table_rows),
    ("trim_document", trim_document),
];

/// Run every pass over `markdown`
pub fn run(markdown: &str) -> String {
    PASSES
        .iter()
        .fold(markdown.to_string(), |text, (_, pass)| pass(&text))
}

/// Three or more consecutive newlines become exactly two
pub fn collapse_blank_lines(text: &str) -> String {
    THREE_OR_MORE_NEWLINES.replace_all(text, "\n\n").into_owned()
}

/// Drop the blank lines that directly follow an opening code fence
pub fn tighten_code_fences(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    // Length of the fence we are inside of, if any
    let mut open_fence: Option<usize> = None;
    let mut just_opened = false;

    for line in text.split('\n') {
        if just_opened && line.trim().is_empty() {
            continue;
        }
        just_opened = false;

        match open_fence {
            None => {
                if let Some(ticks) = opening_fence(line) {
                    open_fence = Some(ticks);
                    just_opened = true;
                }
            }
            Some(open) if is_closing_fence(line, open) => open_fence = None,
            Some(_) => {}
        }
        out.push(line);
    }

    out.join("\n")
}

/// Fence length of a line that opens a backtick fence: three or more
/// backticks followed by an info string without backticks
fn opening_fence(line: &str) -> Option<usize> {
    let line = line.trim_start();
    let ticks = line.chars().take_while(|&c| c == '`').count();
    (ticks >= 3 && !line[ticks..].contains('`')).then_some(ticks)
}

/// A line of only backticks, at least as long as the open fence
fn is_closing_fence(line: &str, open: usize) -> bool {
    let line = line.trim();
    line.len() >= open && line.chars().all(|c| c == '`')
}

/// Cleanup after the fence fix; any remaining run of three or more newlines
/// becomes two
pub fn collapse_triple_newlines(text: &str) -> String {
    THREE_OR_MORE_NEWLINES.replace_all(text, "\n\n").into_owned()
}

/// Put a link that directly follows another link on the next line onto the
/// same line, separated by a space.
///
/// This undoes the one-link-per-line layout of navigation remnants, but it
/// also pulls together legitimate links that happen to sit on adjacent lines.
/// Applied until nothing changes, so chains of any length end up on one line.
pub fn join_adjacent_links(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ADJACENT_LINKS.replace_all(&current, "$1 $2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Pipe-table rows are separated by exactly one newline
pub fn tighten_table_rows(text: &str) -> String {
    TABLE_ROW_BREAK.replace_all(text, "|\n|").into_owned()
}

pub fn trim_document(text: &str) -> String {
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_tighten_code_fences_only_after_opening_fence() {
        assert_eq!(
            tighten_code_fences("```js\n\nlet a;\n```\n\nafter"),
            "```js\nlet a;\n```\n\nafter"
        );
    }

    #[test]
    fn test_tighten_code_fences_respects_longer_fences() {
        let text = "````\n```rust\n\nfn main() {}\n```\n````";
        assert_eq!(
            tighten_code_fences(text),
            "````\n```rust\n\nfn main() {}\n```\n````"
        );
    }

    #[test]
    fn test_inline_triple_backtick_span_is_not_a_fence() {
        let text = "```a``b``` text\n\nNext paragraph\n\n```\nx\n```\n\nAfter";
        assert_eq!(tighten_code_fences(text), text);
    }

    #[test]
    fn test_tighten_code_fences_drops_every_blank_line_after_opening() {
        assert_eq!(tighten_code_fences("```\n \n\t\n\nx\n```"), "```\nx\n```");
    }

    #[test]
    fn test_collapse_triple_newlines() {
        assert_eq!(collapse_triple_newlines("a\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_join_adjacent_links_chain() {
        assert_eq!(
            join_adjacent_links("[A](/a)\n[B](/b)\n\n[C](/c)\ntext"),
            "[A](/a) [B](/b) [C](/c)\ntext"
        );
    }

    #[test]
    fn test_join_adjacent_links_also_merges_prose_links() {
        // Two links ending and starting adjacent lines of prose are merged
        // too; the pass cannot tell them from navigation leftovers.
        assert_eq!(
            join_adjacent_links("See [docs](/d)\n[API](/api) for details."),
            "See [docs](/d) [API](/api) for details."
        );
    }

    #[test]
    fn test_link_followed_by_text_is_left_alone() {
        let text = "[A](/a)\nplain line";
        assert_eq!(join_adjacent_links(text), text);
    }

    #[test]
    fn test_tighten_table_rows() {
        assert_eq!(
            tighten_table_rows("| a |  \n  | b |\n\n| c |"),
            "| a |\n| b |\n| c |"
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let raw = "\n\n# Title\n\n\n\n```py\n\nx = 1\n```\n\n\n[A](/a)\n[B](/b)\n\n| h |\n| :---: |\n  | v |\n\n\n";
        let once = run(raw);
        assert_eq!(
            once,
            "# Title\n\n```py\nx = 1\n```\n\n[A](/a) [B](/b)\n\n| h |\n| :---: |\n| v |"
        );
        assert_eq!(run(&once), once);
    }

    #[test]
    fn test_run_is_idempotent_with_whitespace_only_lines() {
        let inputs = [
            "```\n \n \nx\n```",
            "a\n \n \n \nb",
            "```js\n\t\n\nlet a;\n```\n \n\n\nafter",
            "| a |\n \n| b |\n \n \ntext",
            "[A](/a)\n \n[B](/b)",
        ];
        for input in inputs {
            let once = run(input);
            assert_eq!(run(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_pass_order() {
        let names: Vec<&str> = PASSES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "collapse_blank_lines",
                "tighten_code_fences",
                "collapse_triple_newlines",
                "join_adjacent_links",
                "tighten_table_rows",
                "trim_document"
            ]
        );
    }
}
