//! Node model: handles, kinds and the tagged payload.
//!
//! A node's payload is a sum type, so a node can never carry a string and a
//! child list at the same time. Children are stored as owned handle vectors
//! inside the payload; the parent link is a plain (non-owning) handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle to a node stored in a [`Tree`](crate::Tree).
///
/// Slots are recycled after a node is freed, but the generation is bumped,
/// so an old handle never resolves to the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Slot index inside the arena. Only meaningful together with the
    /// generation; exposed for debugging output.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// The active tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Undefined,
    Object,
    Array,
    Number,
    String,
    Bool,
    Null,
}

impl Kind {
    /// Lowercase name, as printed by dumps and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Null => "null",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, Kind::Object | Kind::Array)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific data. Exactly one variant is live at a time.
#[derive(Debug)]
pub(crate) enum Payload {
    Undefined,
    Object(Vec<NodeId>),
    Array(Vec<NodeId>),
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

impl Payload {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Payload::Undefined => Kind::Undefined,
            Payload::Object(_) => Kind::Object,
            Payload::Array(_) => Kind::Array,
            Payload::Number(_) => Kind::Number,
            Payload::String(_) => Kind::String,
            Payload::Bool(_) => Kind::Bool,
            Payload::Null => Kind::Null,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            Payload::Object(children) | Payload::Array(children) => children.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Payload::Object(children) | Payload::Array(children) => Some(children),
            _ => None,
        }
    }

    /// Numeric view: numbers as-is, booleans as 0/1, everything else 0.
    pub(crate) fn number(&self) -> f64 {
        match self {
            Payload::Number(n) => *n,
            Payload::Bool(true) => 1.0,
            _ => 0.0,
        }
    }
}

/// One arena entry.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) payload: Payload,
    pub(crate) name: Option<String>,
    pub(crate) order_index: u32,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn new() -> Self {
        Self {
            payload: Payload::Undefined,
            name: None,
            order_index: 0,
            parent: None,
        }
    }
}
