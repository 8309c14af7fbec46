//! Table normalizer.
//!
//! Rewrites each table into `thead?` + `tbody` so the table rule can tell
//! header rows from body rows structurally.

use crate::node::Node;

/// Normalize every table under `root` (including `root`). Returns how many
/// tables were rewritten.
pub fn normalize_tables(root: &mut Node) -> usize {
    let mut changed = 0;
    if root.is("table") && normalize_table(root) {
        changed += 1;
    }
    for child in root.children.iter_mut().filter(|c| c.is_element()) {
        changed += normalize_tables(child);
    }
    changed
}

fn normalize_table(table: &mut Node) -> bool {
    let mut changed = false;

    if !table.element_children().any(|c| c.is("tbody")) {
        wrap_rows_in_tbody(table);
        changed = true;
    }

    if !table.element_children().any(|c| c.is("thead")) {
        changed |= promote_header_row(table);
    }

    changed
}

/// Move the table's direct rows into a new `tbody` placed where the first
/// row was.
fn wrap_rows_in_tbody(table: &mut Node) {
    let first_row = table.children.iter().position(|c| c.is("tr"));
    let (rows, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut table.children)
        .into_iter()
        .partition(|c| c.is("tr"));

    let mut tbody = Node::element("tbody");
    tbody.children = rows;

    table.children = rest;
    let at = first_row.unwrap_or(table.children.len()).min(table.children.len());
    table.children.insert(at, tbody);
}

/// If the first body row is made only of `th` cells, move it into a new
/// `thead` ahead of the body.
fn promote_header_row(table: &mut Node) -> bool {
    let Some(tbody_index) = table.children.iter().position(|c| c.is("tbody")) else {
        return false;
    };
    let tbody = &mut table.children[tbody_index];
    let Some(row_index) = tbody.children.iter().position(|c| c.is("tr")) else {
        return false;
    };
    if !is_header_row(&tbody.children[row_index]) {
        return false;
    }

    let row = tbody.children.remove(row_index);
    let mut thead = Node::element("thead");
    thead.add_child(row);
    table.children.insert(tbody_index, thead);
    true
}

/// A row with at least one cell where every cell is `th`
pub fn is_header_row(row: &Node) -> bool {
    let mut cells = row
        .element_children()
        .filter(|c| c.is("th") || c.is("td"))
        .peekable();
    cells.peek().is_some() && cells.all(|c| c.is("th"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(tag: &str, text: &str) -> Node {
        Node::element(tag).with_child(Node::text(text))
    }

    fn row(tag: &str, cells: &[&str]) -> Node {
        cells
            .iter()
            .fold(Node::element("tr"), |tr, text| tr.with_child(cell(tag, text)))
    }

    fn child_tags(node: &Node) -> Vec<&str> {
        node.element_children().map(|c| c.tag_name()).collect()
    }

    #[test]
    fn test_wraps_bare_rows_in_tbody() {
        let mut table = Node::element("table")
            .with_child(Node::element("caption"))
            .with_child(row("td", &["A", "B"]))
            .with_child(row("td", &["C", "D"]));

        assert_eq!(normalize_tables(&mut table), 1);
        assert_eq!(child_tags(&table), vec!["caption", "tbody"]);
        assert_eq!(table.children[1].children.len(), 2);
    }

    #[test]
    fn test_promotes_th_row_to_thead() {
        let mut table = Node::element("table")
            .with_child(row("th", &["Name", "Type"]))
            .with_child(row("td", &["id", "int"]));

        normalize_tables(&mut table);
        assert_eq!(child_tags(&table), vec!["thead", "tbody"]);
        assert_eq!(table.children[0].text_content(), "NameType");
        assert_eq!(table.children[1].text_content(), "idint");
    }

    #[test]
    fn test_mixed_first_row_stays_in_body() {
        let mut table = Node::element("table").with_child(
            Node::element("tr")
                .with_child(cell("th", "key"))
                .with_child(cell("td", "value")),
        );

        normalize_tables(&mut table);
        assert_eq!(child_tags(&table), vec!["tbody"]);
    }

    #[test]
    fn test_existing_structure_is_untouched() {
        let mut table = Node::element("table")
            .with_child(Node::element("thead").with_child(row("th", &["H"])))
            .with_child(Node::element("tbody").with_child(row("td", &["x"])));
        let snapshot = table.clone();

        assert_eq!(normalize_tables(&mut table), 0);
        assert_eq!(table, snapshot);
    }

    #[test]
    fn test_nested_tables_are_normalized() {
        let inner = Node::element("table").with_child(row("td", &["inner"]));
        let mut outer = Node::element("div").with_child(inner);

        assert_eq!(normalize_tables(&mut outer), 1);
        assert!(outer.children[0].children[0].is("tbody"));
    }
}
