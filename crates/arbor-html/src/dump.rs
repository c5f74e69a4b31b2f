//! Indented text dumps of a tree, for debugging.

use std::fmt::Write;

use arbor_dom::{DomTree, NodeId, NodeType};

/// Render the subtree at `id`, one node per line, two spaces per level.
///
/// Attributes are sorted by name so the output is stable.
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    let mut pending = vec![(id, indent)];
    while let Some((current, depth)) = pending.pop() {
        let Some(node) = tree.get(current) else {
            continue;
        };
        let prefix = "  ".repeat(depth);
        let _ = match &node.node_type {
            NodeType::Document => writeln!(out, "{prefix}Document"),
            NodeType::Element(data) if data.attrs.is_empty() => {
                writeln!(out, "{prefix}<{}>", data.tag_name)
            }
            NodeType::Element(data) => {
                let mut attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(k, v)| {
                        if v.is_empty() {
                            k.clone()
                        } else {
                            format!("{k}=\"{v}\"")
                        }
                    })
                    .collect();
                attrs.sort();
                writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "))
            }
            NodeType::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                writeln!(out, "{prefix}\"{display}\"")
            }
        };
        pending.extend(
            tree.child_nodes(current)
                .iter()
                .rev()
                .map(|&child| (child, depth + 1)),
        );
    }
    out
}

/// Print [`dump_tree`] to stdout.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", dump_tree(tree, id, indent));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    #[test]
    fn test_dump_shape() {
        let tree =
            parse_document(r#"<ul id="tree" class="a"><li>two words</li><br/></ul>"#).unwrap();
        assert_eq!(
            dump_tree(&tree, NodeId::ROOT, 0),
            "Document\n  <ul class=\"a\" id=\"tree\">\n    <li>\n      \"two\u{00B7}words\"\n    <br>\n"
        );
    }

    #[test]
    fn test_dump_starts_at_given_depth() {
        let tree = parse_document("<p>x</p>").unwrap();
        let p = tree.first_element_child(NodeId::ROOT).unwrap();
        assert_eq!(dump_tree(&tree, p, 2), "    <p>\n      \"x\"\n");
    }
}
