//! XML serializer.
//!
//! Output only; there is no XML parser. Named nodes become elements and
//! scalars become element text. Array elements carry no name, so each one is
//! wrapped in an `<item>` element. A nameless root writes its content
//! without a wrapping element. Names are used verbatim as tag names; a
//! name that is not a valid XML name produces invalid XML.
//!
//! ```
//! use dyntree_core::{json, xml, Tree};
//!
//! let mut tree = Tree::new();
//! let root = json::from_json(&mut tree, r#"{"user":{"name":"A & B","tags":["x"]}}"#).unwrap();
//! assert_eq!(
//!     xml::to_xml(&tree, root),
//!     "<user>\n\t<name>A &amp; B</name>\n\t<tags>\n\t\t<item>x</item>\n\t</tags>\n</user>\n"
//! );
//! ```

use crate::node::{Kind, NodeId};
use crate::tree::Tree;

/// Tag used for nameless array elements.
pub const ITEM_TAG: &str = "item";

/// Serialize a subtree as tab-indented XML.
pub fn to_xml(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    match tree.name(node) {
        Some(name) => write_element(tree, node, name, 0, &mut out),
        None => write_content(tree, node, 0, &mut out),
    }
    out
}

fn write_element(tree: &Tree, node: NodeId, tag: &str, depth: usize, out: &mut String) {
    indent(depth, out);
    if !tree.is_container(node) {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        push_escaped(&scalar_text(tree, node), out);
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
        return;
    }
    if tree.len(node) == 0 {
        out.push('<');
        out.push_str(tag);
        out.push_str("/>\n");
        return;
    }
    out.push('<');
    out.push_str(tag);
    out.push_str(">\n");
    write_content(tree, node, depth + 1, out);
    indent(depth, out);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

/// Children of a container, or the bare text of a scalar.
fn write_content(tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
    if !tree.is_container(node) {
        indent(depth, out);
        push_escaped(&scalar_text(tree, node), out);
        out.push('\n');
        return;
    }
    for &child in tree.children(node) {
        let tag = tree.name(child).unwrap_or(ITEM_TAG);
        write_element(tree, child, tag, depth, out);
    }
}

fn scalar_text(tree: &Tree, node: NodeId) -> String {
    match tree.kind(node) {
        Kind::Undefined => String::new(),
        _ => tree.display_text(node),
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn push_escaped(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
