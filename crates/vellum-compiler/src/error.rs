//! Error types for template compilation.

use thiserror::Error;

use crate::ast::SourceLocation;

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Prefix for errors that point at a bug rather than at the template.
pub const REPORT_PREFIX: &str = "Report this error to the maintainers";

/// Errors raised while compiling a template unit.
///
/// Every variant produced while walking a template carries the location in
/// the original template source, so editors can point at the template and not
/// at the generated code.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// Expression text failed to parse
    #[error("{message}")]
    Syntax {
        /// Parser message without its own position marker
        message: String,
        /// Position inside the template
        location: SourceLocation,
    },

    /// A tree node kind has no rewrite rule
    #[error("\"{kind}\" is not supported")]
    UnsupportedNode {
        /// ESTree kind of the node
        kind: String,
        /// Position of the node
        location: SourceLocation,
    },

    /// A destructuring pattern element is not a plain name
    #[error("{pattern} destructuring should not reference dynamic properties")]
    InvalidDestructuring {
        /// `Object` or `Array`
        pattern: &'static str,
        /// Position of the destructured parameter
        location: SourceLocation,
    },

    /// Arrow function parameter of a shape the parser should never produce
    #[error("Report this error to the maintainers: Unexpected arrow function property type {kind}")]
    UnexpectedParameterShape {
        /// ESTree kind of the parameter
        kind: String,
        /// Position of the parameter
        location: SourceLocation,
    },

    /// Object literal member of a shape the parser should never produce
    #[error("Report this error to the maintainers: Unexpected object property type \"{kind}\"")]
    UnexpectedObjectProperty {
        /// ESTree kind of the member
        kind: String,
        /// Position of the member
        location: SourceLocation,
    },

    /// `await` used while async mode is off
    #[error("Make sure to render template in async mode before using await expression")]
    AwaitNotAllowed {
        /// Position of the await expression
        location: SourceLocation,
    },

    /// Tag token without a registered plugin
    #[error("Unknown tag \"{name}\"")]
    UnknownTag {
        /// Tag name
        name: String,
        /// Position of the tag
        location: SourceLocation,
    },

    /// Raised by a tag plugin
    #[error("{message}")]
    Tag {
        /// Plugin message
        message: String,
        /// Position of the tag
        location: SourceLocation,
    },

    /// Raised by the tokenizer
    #[error("{message}")]
    Tokenize {
        /// Tokenizer message
        message: String,
        /// Position inside the template
        location: SourceLocation,
    },

    /// Invalid options
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// `compile` called on a parser without a tokenizer
    #[error("No tokenizer configured for this parser")]
    MissingTokenizer,
}

impl CompileError {
    /// The template location the error points at, if any.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompileError::Syntax { location, .. }
            | CompileError::UnsupportedNode { location, .. }
            | CompileError::InvalidDestructuring { location, .. }
            | CompileError::UnexpectedParameterShape { location, .. }
            | CompileError::UnexpectedObjectProperty { location, .. }
            | CompileError::AwaitNotAllowed { location }
            | CompileError::UnknownTag { location, .. }
            | CompileError::Tag { location, .. }
            | CompileError::Tokenize { location, .. } => Some(location),
            CompileError::Config(_) | CompileError::MissingTokenizer => None,
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Syntax { .. } => "E_ACORN_ERROR",
            CompileError::UnsupportedNode { .. } => "E_UNALLOWED_EXPRESSION",
            CompileError::InvalidDestructuring { .. }
            | CompileError::UnexpectedParameterShape { .. }
            | CompileError::UnexpectedObjectProperty { .. }
            | CompileError::AwaitNotAllowed { .. } => "E_PARSER_ERROR",
            CompileError::UnknownTag { .. } => "E_UNKNOWN_TAG",
            CompileError::Tag { .. } => "E_TAG_ERROR",
            CompileError::Tokenize { .. } => "E_LEXER_ERROR",
            CompileError::Config(_) => "E_CONFIG",
            CompileError::MissingTokenizer => "E_MISSING_TOKENIZER",
        }
    }

    /// True when the error indicates a parser/rewriter mismatch instead of a
    /// template mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CompileError::UnexpectedParameterShape { .. }
                | CompileError::UnexpectedObjectProperty { .. }
        )
    }
}
