//! JSON codec.
//!
//! Parsing goes through `serde_json` (member order preserved, last duplicate
//! key wins) and builds the tree with the public mutators. Serialization
//! walks the tree directly so numbers follow the crate-wide formatting
//! contract: integral values print without a decimal point and nothing is
//! printed in exponent form. Non-finite numbers and `Undefined` nodes
//! serialize as `null`.
//!
//! # Example
//! ```
//! use dyntree_core::{json, Tree};
//!
//! let mut tree = Tree::new();
//! let root = json::from_json(&mut tree, r#"{"name":"Alice","scores":[95,87.5]}"#).unwrap();
//! tree.set_field_number(root, "age", 30.0).unwrap();
//! assert_eq!(
//!     json::to_json(&tree, root).unwrap(),
//!     r#"{"name":"Alice","scores":[95,87.5],"age":30}"#
//! );
//! ```

use crate::convert::format_number;
use crate::error::{Format, ParseErrorKind, Result, TreeError};
use crate::node::{Kind, NodeId};
use crate::tree::Tree;
use log::debug;
use serde_json::error::Category;
use serde_json::{Map, Number, Value};

/// Parse JSON text into a new detached root.
///
/// On error nothing is left allocated in the tree.
pub fn from_json(tree: &mut Tree, text: &str) -> Result<NodeId> {
    debug!("parsing {} bytes of JSON", text.len());
    let value: Value = serde_json::from_str(text).map_err(|e| parse_error(text, &e))?;
    from_value(tree, &value)
}

/// Build a new detached root from an already-parsed `serde_json::Value`.
pub fn from_value(tree: &mut Tree, value: &Value) -> Result<NodeId> {
    let root = tree.create();
    build(tree, root, value).inspect_err(|_| tree.free(root))?;
    Ok(root)
}

fn build(tree: &mut Tree, node: NodeId, value: &Value) -> Result<()> {
    match value {
        Value::Null => tree.set_null(node),
        Value::Bool(b) => tree.set_bool(node, *b),
        Value::Number(n) => tree.set_number(node, n.as_f64().unwrap_or(0.0)),
        Value::String(s) => tree.set_string(node, s.as_str()),
        Value::Array(items) => {
            tree.set_array(node)?;
            for item in items {
                let child = tree.append(node, None)?;
                build(tree, child, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            tree.set_object(node)?;
            for (key, item) in map {
                let child = tree.set_field(node, key, None)?;
                build(tree, child, item)?;
            }
            Ok(())
        }
    }
}

/// Translate a `serde_json` failure into a parse error with a byte offset.
fn parse_error(text: &str, err: &serde_json::Error) -> TreeError {
    let message = err.to_string();
    let message = message
        .split(" at line ")
        .next()
        .unwrap_or_default()
        .to_string();
    let kind = match err.classify() {
        Category::Eof => ParseErrorKind::UnexpectedEof,
        Category::Syntax => ParseErrorKind::Syntax(message),
        Category::Data | Category::Io => ParseErrorKind::InvalidData(message),
    };
    TreeError::Parse {
        format: Format::Json,
        kind,
        offset: byte_offset(text, err.line(), err.column()),
    }
}

/// Convert serde_json's 1-based line/column into a byte offset.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start = if line == 1 {
        0
    } else {
        text.match_indices('\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .unwrap_or(text.len())
    };
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Convert a subtree into a `serde_json::Value`.
pub fn to_value(tree: &Tree, node: NodeId) -> Value {
    match tree.kind(node) {
        Kind::Undefined | Kind::Null => Value::Null,
        Kind::Bool => Value::Bool(tree.boolean(node)),
        Kind::Number => number_value(tree.number(node)),
        Kind::String => Value::String(tree.string(node).unwrap_or_default().to_owned()),
        Kind::Array => Value::Array(
            tree.children(node)
                .iter()
                .map(|child| to_value(tree, *child))
                .collect(),
        ),
        Kind::Object => {
            let mut map = Map::new();
            for (i, child) in tree.children(node).iter().enumerate() {
                map.insert(member_name(tree, *child, i), to_value(tree, *child));
            }
            Value::Object(map)
        }
    }
}

fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Object members always carry a name; fall back to the position anyway so
/// serialization never has to fail.
fn member_name(tree: &Tree, child: NodeId, position: usize) -> String {
    tree.name(child)
        .map(str::to_owned)
        .unwrap_or_else(|| position.to_string())
}

/// Serialize a subtree as compact JSON.
pub fn to_json(tree: &Tree, node: NodeId) -> Result<String> {
    let mut out = String::new();
    write_value(tree, node, None, &mut out)?;
    Ok(out)
}

/// Serialize a subtree as JSON indented with two spaces per level.
pub fn to_json_pretty(tree: &Tree, node: NodeId) -> Result<String> {
    let mut out = String::new();
    write_value(tree, node, Some(0), &mut out)?;
    Ok(out)
}

/// `depth` is `None` for compact output, otherwise the current indent level.
fn write_value(tree: &Tree, node: NodeId, depth: Option<usize>, out: &mut String) -> Result<()> {
    match tree.kind(node) {
        Kind::Undefined | Kind::Null => out.push_str("null"),
        Kind::Bool => out.push_str(if tree.boolean(node) { "true" } else { "false" }),
        Kind::Number => {
            let n = tree.number(node);
            if n.is_finite() {
                out.push_str(&format_number(n));
            } else {
                out.push_str("null");
            }
        }
        Kind::String => write_string(tree.string(node).unwrap_or_default(), out)?,
        Kind::Array => {
            let children = tree.children(node);
            if children.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push('[');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(depth.map(|d| d + 1), out);
                write_value(tree, *child, depth.map(|d| d + 1), out)?;
            }
            newline(depth, out);
            out.push(']');
        }
        Kind::Object => {
            let children = tree.children(node);
            if children.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push('{');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(depth.map(|d| d + 1), out);
                write_string(&member_name(tree, *child, i), out)?;
                out.push(':');
                if depth.is_some() {
                    out.push(' ');
                }
                write_value(tree, *child, depth.map(|d| d + 1), out)?;
            }
            newline(depth, out);
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut String) -> Result<()> {
    out.push_str(&serde_json::to_string(s)?);
    Ok(())
}

fn newline(depth: Option<usize>, out: &mut String) {
    if let Some(depth) = depth {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
}
