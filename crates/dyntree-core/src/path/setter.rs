//! Assigning values through paths.

use super::resolver::step;
use super::tokenizer::Path;
use crate::error::{Result, TreeError};
use crate::node::NodeId;
use crate::tree::Tree;
use log::debug;

/// Copy the value of `value` into the node at `path` below `root`, creating
/// missing object fields along the way, then free `value`.
///
/// Steps follow the resolver's rules, so existing array elements can be
/// addressed by index. A missing step is created with
/// [`Tree::set_field`], which turns the current node into an Object if it
/// isn't one (scalars are torn down, arrays get positional names).
///
/// `value` must be a detached root that is not an ancestor of `root`.
/// Empty paths and wildcard tokens are rejected before anything changes.
pub fn set_path(tree: &mut Tree, root: NodeId, path: &Path, value: NodeId) -> Result<NodeId> {
    if path.is_empty() {
        return Err(TreeError::InvalidPath {
            path: path.to_string(),
            reason: "empty path",
        });
    }
    if path.has_wildcard() {
        return Err(TreeError::InvalidPath {
            path: path.to_string(),
            reason: "wildcards cannot be assigned",
        });
    }
    if !tree.contains(root) {
        return Err(TreeError::StaleNode(root));
    }
    if !tree.contains(value) {
        return Err(TreeError::StaleNode(value));
    }
    if tree.parent(value).is_some() {
        return Err(TreeError::AlreadyAttached(value));
    }
    if tree.ancestors(root).any(|a| a == value) {
        return Err(TreeError::CyclicInsert {
            container: root,
            value,
        });
    }

    let mut node = root;
    for token in path.tokens() {
        node = match step(tree, node, token) {
            Some(next) => next,
            None => {
                let name = token.as_name().unwrap_or_default();
                debug!("set_path {path}: creating field '{name}' under {node}");
                tree.set_field(node, name, None)?
            }
        };
    }
    tree.copy_value_from(node, value)?;
    tree.free(value);
    Ok(node)
}

/// Run `set_path` with a freshly created value, freeing it on failure.
fn set_path_owned(tree: &mut Tree, root: NodeId, path: &Path, value: NodeId) -> Result<NodeId> {
    set_path(tree, root, path, value).inspect_err(|_| tree.free(value))
}

pub fn set_path_number(tree: &mut Tree, root: NodeId, path: &Path, number: f64) -> Result<NodeId> {
    let value = tree.create_number(number);
    set_path_owned(tree, root, path, value)
}

pub fn set_path_string(tree: &mut Tree, root: NodeId, path: &Path, text: &str) -> Result<NodeId> {
    let value = tree.create_string(text);
    set_path_owned(tree, root, path, value)
}

pub fn set_path_bool(tree: &mut Tree, root: NodeId, path: &Path, flag: bool) -> Result<NodeId> {
    let value = tree.create_bool(flag);
    set_path_owned(tree, root, path, value)
}

pub fn set_path_null(tree: &mut Tree, root: NodeId, path: &Path) -> Result<NodeId> {
    let value = tree.create_null();
    set_path_owned(tree, root, path, value)
}
