//! Exact path resolution.

use super::tokenizer::{Path, Token};
use crate::node::NodeId;
use crate::tree::Tree;

/// Resolve one path step below `node`.
///
/// An all-digit token is always positional, on objects as well as arrays,
/// so `"0"` names the first member even when some field is called `"0"`.
/// Any other token is a field lookup. The wildcard never resolves.
pub(crate) fn step(tree: &Tree, node: NodeId, token: &Token) -> Option<NodeId> {
    let name = token.as_name()?;
    match token.as_index() {
        Some(index) => tree.at_index(node, index),
        None => tree.by_name(node, name),
    }
}

/// Follow `path` from `root` and return the node it names.
///
/// Every token must match; the first miss makes the whole lookup `None`.
/// An empty path resolves to `root` itself.
pub fn resolve(tree: &Tree, root: NodeId, path: &Path) -> Option<NodeId> {
    if !tree.contains(root) {
        return None;
    }
    path.tokens()
        .iter()
        .try_fold(root, |node, token| step(tree, node, token))
}

/// First child of the resolved node.
pub fn resolve_first(tree: &Tree, root: NodeId, path: &Path) -> Option<NodeId> {
    resolve(tree, root, path).and_then(|n| tree.first(n))
}

/// Numeric payload at `path`, 0 when missing.
pub fn resolve_number(tree: &Tree, root: NodeId, path: &Path) -> f64 {
    resolve(tree, root, path)
        .map(|n| tree.number(n))
        .unwrap_or(0.0)
}

/// String payload at `path`.
pub fn resolve_string<'t>(tree: &'t Tree, root: NodeId, path: &Path) -> Option<&'t str> {
    resolve(tree, root, path).and_then(|n| tree.string(n))
}

/// Truth value at `path`, false when missing.
pub fn resolve_bool(tree: &Tree, root: NodeId, path: &Path) -> bool {
    resolve(tree, root, path)
        .map(|n| tree.boolean(n))
        .unwrap_or(false)
}

/// Caller-owned memo for repeated lookups against the same root.
///
/// Keeps the most recent `(token, node)` per level. A query reuses the
/// longest cached prefix that matches its own tokens. Everything is dropped
/// when the root changes or the tree has been mutated since the last query.
#[derive(Debug, Default)]
pub struct ResolveCache {
    root: Option<NodeId>,
    revision: u64,
    levels: Vec<(Token, NodeId)>,
    hits: u64,
    misses: u64,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same result as [`resolve`], reusing cached prefix steps.
    pub fn resolve(&mut self, tree: &Tree, root: NodeId, path: &Path) -> Option<NodeId> {
        if self.root != Some(root) || self.revision != tree.revision() {
            self.levels.clear();
            self.root = Some(root);
            self.revision = tree.revision();
        }
        if !tree.contains(root) {
            return None;
        }

        let mut node = root;
        for (level, token) in path.tokens().iter().enumerate() {
            if let Some((cached, hit)) = self.levels.get(level) {
                if cached == token {
                    node = *hit;
                    self.hits += 1;
                    continue;
                }
            }
            self.misses += 1;
            self.levels.truncate(level);
            node = step(tree, node, token)?;
            self.levels.push((token.clone(), node));
        }
        Some(node)
    }

    /// Steps answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Steps that had to scan the tree.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.levels.clear();
    }
}
