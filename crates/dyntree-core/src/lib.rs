//! # dyntree-core
//!
//! A dynamically-typed value tree with a small path query language.
//!
//! Every node is one of Undefined, Object, Array, Number, String, Bool or
//! Null, and nodes nest arbitrarily. Nodes live in a [`Tree`] arena and are
//! addressed by generational [`NodeId`] handles: freeing a node invalidates
//! its handle, and a stale handle reads as an absent node instead of
//! aliasing whatever reuses the slot.
//!
//! ## Quick start
//!
//! ```rust
//! use dyntree_core::{json, path, Tree};
//!
//! let mut tree = Tree::new();
//! let root = json::from_json(&mut tree, r#"{"foo":{"p1":1,"p2":2},"bar":{"p2":3}}"#).unwrap();
//!
//! // Exact lookup
//! let p1 = path::lookup(&tree, root, "foo/p1").unwrap();
//! assert_eq!(tree.number(p1), 1.0);
//!
//! // Wildcard search, in document order
//! let p2s: Vec<f64> = path::pick(&tree, root, "*/p2").map(|n| tree.number(n)).collect();
//! assert_eq!(p2s, vec![2.0, 3.0]);
//!
//! // Assignment through a path creates missing fields
//! let p = path::Path::parse("baz/p3", &path::PathConfig::default());
//! path::set_path_number(&mut tree, root, &p, 4.0).unwrap();
//! assert_eq!(
//!     json::to_json(&tree, root).unwrap(),
//!     r#"{"foo":{"p1":1,"p2":2},"bar":{"p2":3},"baz":{"p3":4}}"#
//! );
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: the node arena and every mutation
//! - [`node`]: `NodeId` handles and the `Kind` tag
//! - [`path`]: tokenizer, exact resolver, wildcard picker, path setter
//! - [`json`] / [`ini`]: parse and serialize
//! - [`xml`]: serialize only
//! - [`dump`]: debug listings
//! - [`convert`]: number formatting and lenient number parsing
//! - [`error`]: `TreeError`

pub mod convert;
pub mod dump;
pub mod error;
pub mod ini;
pub mod json;
pub mod node;
pub mod path;
pub mod tree;
pub mod xml;

pub use convert::format_number;
pub use error::{Format, ParseErrorKind, Result, TreeError};
pub use node::{Kind, NodeId};
pub use path::{Path, PathConfig, Picker};
pub use tree::Tree;
