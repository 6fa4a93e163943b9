//! Template tokens.
//!
//! Turning template text into tokens is the job of an external tokenizer;
//! this module defines the token stream it hands over and the trait it is
//! plugged in through.
//!
//! ## Structure
//!
//! - `token.rs` - `Token` and its payloads, serde-compatible with the
//!   edge-lexer JSON shape (`type`, `properties`, `loc`, `filename`)
//!
//! ## Usage
//!
//! ```rust
//! use vellum_compiler::lexer::Token;
//!
//! let tokens: Vec<Token> = serde_json::from_str(
//!     r#"[{ "type": "raw", "value": "Hi", "line": 1, "filename": "a.edge" }]"#,
//! ).unwrap();
//! assert_eq!(tokens[0].type_name(), "raw");
//! ```

mod token;

pub use token::{
    LexerLoc, LexerPosition, MustacheProperties, MustacheToken, NewlineToken, RawToken,
    TagProperties, TagToken, Token,
};

use crate::error::Result;

/// Splits template text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenizes `template`, tagging every token with `filename`.
    fn tokenize(&self, template: &str, filename: &str) -> Result<Vec<Token>>;
}
