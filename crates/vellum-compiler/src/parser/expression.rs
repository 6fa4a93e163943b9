//! The seam to the external expression parser.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Node;

/// A parse error reported by an [`ExpressionParser`].
///
/// Positions are relative to the expression text: line 1 is the first line
/// of the fragment, columns are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseFailure {
    /// Parser message, possibly ending in a `(line:column)` marker
    pub message: String,
    /// Line inside the fragment (1-based)
    pub line: u32,
    /// Column inside the fragment (0-based)
    pub column: u32,
}

impl ParseFailure {
    /// Creates a new parse failure.
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Parses expression text into an ESTree tree.
///
/// Implementations return the first top-level statement of the fragment, so
/// `a + b` comes back as an `ExpressionStatement`. Reported locations are
/// relative to the fragment; the caller shifts them into the template.
pub trait ExpressionParser: Send + Sync {
    /// Parses `source`.
    fn parse(&self, source: &str) -> Result<Node, ParseFailure>;
}
