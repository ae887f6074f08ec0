//! Human-readable debug listings.
//!
//! [`dump`] prints one line per node, indented one tab per level:
//!
//! ```text
//! ** object [len=2] [order=0]
//! 	 1 string name = "Alice" [order=0] [parent=#0.0]
//! 	 2 array scores [len=1] [order=1] [parent=#0.0]
//! 		 1 number = 95 [order=0] [parent=#2.0]
//! bytes: 312
//! ```
//!
//! The top node is marked `**`, every other node with its 1-based position
//! among its siblings. The trailing byte count is [`Tree::size`].

use crate::node::{Kind, NodeId};
use crate::path::{path_name, Path, Picker};
use crate::tree::Tree;
use std::io::{self, Write};

/// Write an indented listing of the subtree at `node`.
pub fn dump<W: Write>(tree: &Tree, node: NodeId, out: &mut W) -> io::Result<()> {
    let mut stack = vec![(node, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        write_line(tree, id, depth, id == node, out)?;
        for &child in tree.children(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    writeln!(out, "bytes: {}", tree.size(node))
}

fn write_line<W: Write>(
    tree: &Tree,
    id: NodeId,
    depth: usize,
    top: bool,
    out: &mut W,
) -> io::Result<()> {
    for _ in 0..depth {
        out.write_all(b"\t")?;
    }
    if top {
        write!(out, "**")?;
    } else {
        let position = tree.position(id).map_or(0, |p| p + 1);
        write!(out, "{position:>2}")?;
    }
    write!(out, " {}", tree.kind(id))?;
    if let Some(name) = tree.name(id) {
        write!(out, " {name}")?;
    }
    match tree.kind(id) {
        Kind::Undefined | Kind::Object | Kind::Array => {}
        Kind::String => write!(out, " = {:?}", tree.string(id).unwrap_or_default())?,
        _ => write!(out, " = {}", tree.display_text(id))?,
    }
    if tree.is_container(id) {
        write!(out, " [len={}]", tree.len(id))?;
    }
    write!(out, " [order={}]", tree.order_index(id))?;
    if let Some(parent) = tree.parent(id) {
        write!(out, " [parent={parent}]")?;
    }
    writeln!(out)
}

/// Write `path = value` for every leaf `pattern` matches under `root`.
/// Returns the number of matches.
pub fn dump_picks<W: Write>(
    tree: &Tree,
    root: NodeId,
    pattern: &Path,
    out: &mut W,
) -> io::Result<usize> {
    let config = *pattern.config();
    let mut count = 0;
    for node in Picker::new(tree, root, pattern.clone()) {
        writeln!(
            out,
            "{} = {}",
            path_name(tree, node, &config),
            tree.display_text(node)
        )?;
        count += 1;
    }
    Ok(count)
}
