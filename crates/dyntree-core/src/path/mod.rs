//! Path queries over a [`Tree`].
//!
//! - [`tokenizer`]: separator-delimited path text → [`Path`]
//! - [`resolver`]: exact lookups (single result) and [`ResolveCache`]
//! - [`picker`]: wildcard matching over leaves ([`Picker`]) and [`path_name`]
//! - [`setter`]: assigning values through paths, creating missing fields
//!
//! The `lookup`/`pick` helpers below use the default `/` separator; build a
//! [`Path`] with a custom [`PathConfig`] for anything else.

pub mod picker;
pub mod resolver;
pub mod setter;
pub mod tokenizer;

pub use picker::{path_name, PickState, Picker};
pub use resolver::{
    resolve, resolve_bool, resolve_first, resolve_number, resolve_string, ResolveCache,
};
pub use setter::{set_path, set_path_bool, set_path_null, set_path_number, set_path_string};
pub use tokenizer::{Path, PathConfig, Token, WILDCARD};

use crate::node::NodeId;
use crate::tree::Tree;

/// Exact lookup of a `/`-separated path.
///
/// ```
/// use dyntree_core::{json, path};
///
/// let mut tree = dyntree_core::Tree::new();
/// let root = json::from_json(&mut tree, r#"{"a":[10,20,{"b":"x"}]}"#).unwrap();
/// assert_eq!(path::lookup(&tree, root, "a/1").map(|n| tree.number(n)), Some(20.0));
/// assert_eq!(path::lookup(&tree, root, "a/2/b").and_then(|n| tree.string(n)), Some("x"));
/// assert!(path::lookup(&tree, root, "a/9").is_none());
/// ```
pub fn lookup(tree: &Tree, root: NodeId, text: &str) -> Option<NodeId> {
    resolve(tree, root, &Path::parse(text, &PathConfig::default()))
}

/// Wildcard search over a `/`-separated pattern.
pub fn pick<'t>(tree: &'t Tree, root: NodeId, pattern: &str) -> Picker<'t> {
    Picker::new(tree, root, Path::parse(pattern, &PathConfig::default()))
}

/// First leaf matched by `pattern`, if any.
pub fn pick_first(tree: &Tree, root: NodeId, pattern: &Path) -> Option<NodeId> {
    Picker::new(tree, root, pattern.clone()).next()
}
