//! INI codec.
//!
//! The document root is an Object. `key=value` lines before the first
//! section header become String fields of the root; each `[section]` opens
//! an Object field of the root that collects the following pairs. Keys and
//! values are trimmed, a repeated key overwrites the earlier value, and a
//! repeated section header reopens the existing section.
//!
//! ```
//! use dyntree_core::{ini, Tree};
//!
//! let mut tree = Tree::new();
//! let root = ini::from_ini(&mut tree, "name = demo\n[server]\nport = 8080\n").unwrap();
//! assert_eq!(tree.string_by(root, "name"), Some("demo"));
//! let server = tree.by_name(root, "server").unwrap();
//! assert_eq!(tree.string_by(server, "port"), Some("8080"));
//! assert_eq!(ini::to_ini(&tree, root), "name=demo\n\n[server]\nport=8080\n");
//! ```

use crate::error::{Format, ParseErrorKind, Result, TreeError};
use crate::node::{Kind, NodeId};
use crate::tree::Tree;
use log::{debug, trace};

/// Parse INI text into a new detached Object root.
///
/// On error nothing is left allocated in the tree.
pub fn from_ini(tree: &mut Tree, text: &str) -> Result<NodeId> {
    debug!("parsing {} bytes of INI", text.len());
    let root = tree.create();
    tree.set_object(root)?;
    parse_lines(tree, root, text).inspect_err(|_| tree.free(root))?;
    Ok(root)
}

fn parse_lines(tree: &mut Tree, root: NodeId, text: &str) -> Result<()> {
    let mut section = root;
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(TreeError::Parse {
                    format: Format::Ini,
                    kind: ParseErrorKind::UnterminatedSection,
                    offset: line_start + (raw.len() - raw.trim_start().len()),
                });
            };
            section = tree.set_field(root, name.trim(), None)?;
            if tree.kind(section) != Kind::Object {
                tree.set_object(section)?;
            }
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                tree.set_field_string(section, key.trim(), value.trim())?;
            }
            None => trace!("ignoring INI line without '=' at byte {line_start}"),
        }
    }
    Ok(())
}

/// Serialize a subtree as INI text.
///
/// Scalar members of `root` come first as `key=value` lines, then one
/// `[section]` per named container member. Containers nested deeper are
/// flattened into their section: every named leaf below them becomes a
/// `key=value` line. Nameless leaves (array elements) have no key and are
/// skipped. A scalar root produces empty output.
pub fn to_ini(tree: &Tree, root: NodeId) -> String {
    let mut out = String::new();
    let members = tree.children(root);

    for &member in members {
        if !tree.is_container(member) {
            write_pair(tree, member, &mut out);
        }
    }

    for &member in members {
        if !tree.is_container(member) {
            continue;
        }
        let Some(name) = tree.name(member) else {
            continue;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('[');
        out.push_str(name);
        out.push_str("]\n");
        write_flattened(tree, member, &mut out);
    }
    out
}

fn write_flattened(tree: &Tree, container: NodeId, out: &mut String) {
    for &child in tree.children(container) {
        if tree.is_container(child) {
            write_flattened(tree, child, out);
        } else {
            write_pair(tree, child, out);
        }
    }
}

fn write_pair(tree: &Tree, node: NodeId, out: &mut String) {
    let Some(key) = tree.name(node) else {
        return;
    };
    out.push_str(key);
    out.push('=');
    out.push_str(&tree.display_text(node));
    out.push('\n');
}
