//! Error types for tree mutation, path handling and codec operations.

use crate::node::{Kind, NodeId};
use std::fmt;
use thiserror::Error;

/// Text format a parse error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ini,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("JSON"),
            Format::Ini => f.write_str("INI"),
        }
    }
}

/// What went wrong while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The input ended in the middle of a value.
    UnexpectedEof,
    /// A character that cannot start or continue the current construct.
    Syntax(String),
    /// Well-formed input whose content cannot be represented (e.g. a number
    /// out of range).
    InvalidData(String),
    /// An INI section header without its closing `]`.
    UnterminatedSection,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseErrorKind::Syntax(msg) => write!(f, "syntax error: {msg}"),
            ParseErrorKind::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            ParseErrorKind::UnterminatedSection => f.write_str("unterminated section header"),
        }
    }
}

/// Errors returned by tree mutators, the path layer and the codecs.
///
/// Lookups that miss are not errors; they return `None` or a neutral default.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The handle refers to a node that has been freed.
    #[error("stale node handle {0}")]
    StaleNode(NodeId),

    /// Inserting a node that already has a parent.
    #[error("node {0} is already attached; detach it first")]
    AlreadyAttached(NodeId),

    /// Positional append into an object. Object members go through `set_field`.
    #[error("cannot append to object {0}; use set_field")]
    AppendToObject(NodeId),

    /// `after` anchor is not a child of the target container.
    #[error("node {after} is not a child of {container}")]
    NotAChild { container: NodeId, after: NodeId },

    /// Inserting a node into itself or into one of its own descendants.
    #[error("cannot insert {value} under {container}: it would become its own ancestor")]
    CyclicInsert { container: NodeId, value: NodeId },

    /// An operation that requires a specific kind found another one.
    #[error("node {node} is {found}, expected {expected}")]
    KindMismatch {
        node: NodeId,
        expected: Kind,
        found: Kind,
    },

    /// Path text that cannot be used for the requested operation.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// Path separators must be a single ASCII byte.
    #[error("invalid path separator {0:?}: must be a single ASCII character")]
    InvalidSeparator(char),

    /// Malformed input text. `offset` is a byte offset into the source.
    #[error("{format} parse error at byte {offset}: {kind}")]
    Parse {
        format: Format,
        kind: ParseErrorKind,
        offset: usize,
    },

    /// Failure while producing JSON text.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout dyntree-core.
pub type Result<T> = std::result::Result<T, TreeError>;
