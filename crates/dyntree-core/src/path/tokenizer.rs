//! Path tokenizer.
//!
//! A path is split on a single ASCII separator into non-empty tokens:
//! `"a//b/"` under `/` is `["a", "b"]`. The token `*` is the wildcard; every
//! other token is a field name, and a field name made only of ASCII digits
//! can also be read as an index.
//!
//! There is no escape syntax. A field whose name contains the separator, or
//! is literally `*`, cannot be addressed through a path.

use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The wildcard token.
pub const WILDCARD: &str = "*";

/// Path syntax settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathConfig", into = "RawPathConfig")]
pub struct PathConfig {
    separator: u8,
}

#[derive(Serialize, Deserialize)]
struct RawPathConfig {
    separator: char,
}

impl TryFrom<RawPathConfig> for PathConfig {
    type Error = TreeError;

    fn try_from(raw: RawPathConfig) -> Result<Self> {
        PathConfig::new(raw.separator)
    }
}

impl From<PathConfig> for RawPathConfig {
    fn from(config: PathConfig) -> Self {
        RawPathConfig {
            separator: config.separator(),
        }
    }
}

impl PathConfig {
    /// Build a config for `separator`, which must be ASCII and must not be
    /// the wildcard character.
    pub fn new(separator: char) -> Result<Self> {
        if !separator.is_ascii() || separator == '*' {
            return Err(TreeError::InvalidSeparator(separator));
        }
        Ok(Self {
            separator: separator as u8,
        })
    }

    pub fn separator(&self) -> char {
        self.separator as char
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self { separator: b'/' }
    }
}

/// One path step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `*`: any child.
    Wildcard,
    /// A literal field name.
    Name(String),
}

impl Token {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Token::Wildcard)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Name(name) => Some(name.as_str()),
            Token::Wildcard => None,
        }
    }

    /// Index reading of an all-digit name token.
    pub fn as_index(&self) -> Option<usize> {
        let name = self.as_name()?;
        if name.bytes().all(|b| b.is_ascii_digit()) {
            name.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Wildcard => f.write_str(WILDCARD),
            Token::Name(name) => f.write_str(name),
        }
    }
}

/// A tokenized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    tokens: Vec<Token>,
    config: PathConfig,
}

impl Path {
    /// Tokenize `text` with the given syntax.
    ///
    /// ```
    /// use dyntree_core::path::{Path, PathConfig, Token};
    ///
    /// let path = Path::parse("items/*/name", &PathConfig::default());
    /// assert_eq!(path.len(), 3);
    /// assert!(path.tokens()[1].is_wildcard());
    /// assert_eq!(path.tokens()[2], Token::Name("name".into()));
    /// ```
    pub fn parse(text: &str, config: &PathConfig) -> Self {
        let tokens = text
            .split(config.separator())
            .filter(|t| !t.is_empty())
            .map(|t| {
                if t == WILDCARD {
                    Token::Wildcard
                } else {
                    Token::Name(t.to_owned())
                }
            })
            .collect();
        Self {
            tokens,
            config: *config,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.tokens.iter().any(Token::is_wildcard)
    }

    /// Syntax the path was parsed with.
    pub fn config(&self) -> &PathConfig {
        &self.config
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.config.separator())?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
