//! Wildcard picker: a backtracking iterator over the leaves a path pattern
//! matches.
//!
//! The picker keeps one cursor per path level. Cursor `L` points into the
//! container entered at level `L` and selects the child chosen by token `L`.
//! A wildcard cursor walks every child in order; a literal cursor has at most
//! one position and is never retried. Leaves are yielded in document order:
//!
//! - a leaf reached with every token consumed is a match;
//! - a leaf reached early (short path) is skipped;
//! - a container reached with every token consumed is not a leaf and is
//!   skipped too, so `foo/*` yields only the scalar children of `foo`.

use super::tokenizer::{Path, PathConfig, Token};
use crate::node::{Kind, NodeId};
use crate::tree::Tree;
use std::iter::FusedIterator;

/// Lifecycle of a [`Picker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    /// Created, nothing searched yet.
    Idle,
    /// Inside `advance`.
    Searching,
    /// The last call yielded a match; the cursors still point at it.
    Found,
    /// No further matches. Terminal.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    container: NodeId,
    position: Option<usize>,
}

/// Iterator over the leaves matched by a wildcard path.
///
/// The picker borrows the tree for its whole life, so the tree cannot be
/// mutated while a search is in progress.
///
/// ```
/// use dyntree_core::{Tree, path::{Path, PathConfig, Picker}};
///
/// let mut tree = Tree::new();
/// let root = tree.create();
/// let foo = tree.set_field(root, "foo", None).unwrap();
/// tree.set_field_number(foo, "p1", 1.0).unwrap();
/// tree.set_field_number(foo, "p2", 2.0).unwrap();
/// let bar = tree.set_field(root, "bar", None).unwrap();
/// tree.set_field_number(bar, "p2", 3.0).unwrap();
///
/// let config = PathConfig::new('.').unwrap();
/// let picks: Vec<f64> = Picker::new(&tree, root, Path::parse("*.p2", &config))
///     .map(|n| tree.number(n))
///     .collect();
/// assert_eq!(picks, vec![2.0, 3.0]);
/// ```
#[derive(Debug)]
pub struct Picker<'t> {
    tree: &'t Tree,
    root: NodeId,
    path: Path,
    cursors: Vec<Cursor>,
    state: PickState,
    current: Option<NodeId>,
}

impl<'t> Picker<'t> {
    pub fn new(tree: &'t Tree, root: NodeId, path: Path) -> Self {
        Self {
            tree,
            root,
            path,
            cursors: Vec::new(),
            state: PickState::Idle,
            current: None,
        }
    }

    pub fn state(&self) -> PickState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The most recent match, while the picker is in [`PickState::Found`].
    pub fn current(&self) -> Option<NodeId> {
        match self.state {
            PickState::Found => self.current,
            _ => None,
        }
    }

    /// Cursor for `token[level]` inside `container`.
    fn enter(&self, container: NodeId, level: usize) -> Cursor {
        let position = match &self.path.tokens()[level] {
            Token::Wildcard => Some(0),
            Token::Name(name) if self.tree.kind(container) == Kind::Object => self
                .tree
                .children(container)
                .iter()
                .position(|c| self.tree.name(*c) == Some(name.as_str())),
            Token::Name(_) => None,
        };
        Cursor {
            container,
            position,
        }
    }

    fn candidate(&self, cursor: Cursor) -> Option<NodeId> {
        let position = cursor.position?;
        self.tree.children(cursor.container).get(position).copied()
    }

    /// Move the deepest cursor to its next alternative: the next sibling on
    /// a wildcard level, nothing on a literal level.
    fn next_alternative(&mut self) {
        let level = self.cursors.len().saturating_sub(1);
        let wildcard = self
            .path
            .tokens()
            .get(level)
            .is_some_and(Token::is_wildcard);
        if let Some(top) = self.cursors.last_mut() {
            top.position = if wildcard {
                top.position.map(|p| p + 1)
            } else {
                None
            };
        }
    }

    /// Produce the next match, or move to `Exhausted`.
    fn advance(&mut self) -> Option<NodeId> {
        match self.state {
            PickState::Exhausted => return None,
            PickState::Idle => {
                if self.path.is_empty() || !self.tree.is_container(self.root) {
                    return self.exhaust();
                }
                let seed = self.enter(self.root, 0);
                self.cursors.push(seed);
            }
            PickState::Found => self.next_alternative(),
            PickState::Searching => {}
        }
        self.state = PickState::Searching;

        let depth = self.path.len();
        loop {
            let Some(top) = self.cursors.last().copied() else {
                return self.exhaust();
            };
            let Some(candidate) = self.candidate(top) else {
                // This level has no alternatives left: backtrack.
                self.cursors.pop();
                if self.cursors.is_empty() {
                    return self.exhaust();
                }
                self.next_alternative();
                continue;
            };

            let container = self.tree.is_container(candidate);
            if self.cursors.len() == depth {
                if !container {
                    self.state = PickState::Found;
                    self.current = Some(candidate);
                    return Some(candidate);
                }
                self.next_alternative();
            } else if container {
                let cursor = self.enter(candidate, self.cursors.len());
                self.cursors.push(cursor);
            } else {
                // Short path: a leaf above the requested depth.
                self.next_alternative();
            }
        }
    }

    fn exhaust(&mut self) -> Option<NodeId> {
        self.state = PickState::Exhausted;
        self.current = None;
        self.cursors.clear();
        None
    }
}

impl Iterator for Picker<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.advance()
    }
}

impl FusedIterator for Picker<'_> {}

/// Rebuild the path of `node` from the names on its parent chain. The walk
/// stops at the first nameless node (an array element or an unnamed root),
/// so only the named tail is returned.
///
/// Names are joined with `config`'s separator, not a fixed `.`: picking
/// `a/*/c` yields names like `a/b/c`, so a glob written in the pattern's own
/// separator can be matched against the result directly.
pub fn path_name(tree: &Tree, node: NodeId, config: &PathConfig) -> String {
    let mut names: Vec<&str> = Vec::new();
    for id in tree.ancestors(node) {
        match tree.name(id) {
            Some(name) => names.push(name),
            None => break,
        }
    }
    names.reverse();
    names.join(&config.separator().to_string())
}
