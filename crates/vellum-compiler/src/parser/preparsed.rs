//! An expression parser backed by trees parsed ahead of time.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::expression::{ExpressionParser, ParseFailure};
use crate::ast::Node;

/// The recorded outcome of parsing one expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum PreparsedEntry {
    /// The parsed tree
    #[serde(rename = "ast")]
    Ast(Node),
    /// The parse error
    #[serde(rename = "error")]
    Error(ParseFailure),
}

/// Serves trees produced by an external ESTree parser.
///
/// Deserializes from a JSON object keyed by expression source:
///
/// ```json
/// {
///   " username ": { "ast": { "type": "ExpressionStatement", "expression": { "type": "Identifier", "name": "username" } } },
///   "a +": { "error": { "message": "Unexpected token (1:3)", "line": 1, "column": 3 } }
/// }
/// ```
///
/// Lookups try the source as given first and then with surrounding
/// whitespace removed, so tables keyed by trimmed source work as well.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PreparsedExpressions {
    entries: FxHashMap<String, PreparsedEntry>,
}

impl PreparsedExpressions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Records the tree for `source`.
    pub fn insert(&mut self, source: impl Into<String>, node: Node) -> &mut Self {
        self.entries.insert(source.into(), PreparsedEntry::Ast(node));
        self
    }

    /// Records a parse error for `source`.
    pub fn insert_error(&mut self, source: impl Into<String>, failure: ParseFailure) -> &mut Self {
        self.entries.insert(source.into(), PreparsedEntry::Error(failure));
        self
    }

    /// Number of recorded expressions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, source: &str) -> Option<&PreparsedEntry> {
        self.entries
            .get(source)
            .or_else(|| self.entries.get(source.trim()))
    }
}

impl ExpressionParser for PreparsedExpressions {
    fn parse(&self, source: &str) -> Result<Node, ParseFailure> {
        match self.lookup(source) {
            Some(PreparsedEntry::Ast(node)) => Ok(node.clone()),
            Some(PreparsedEntry::Error(failure)) => Err(failure.clone()),
            None => Err(ParseFailure::new(
                format!("No parsed tree recorded for expression {:?}", source.trim()),
                1,
                0,
            )),
        }
    }
}
