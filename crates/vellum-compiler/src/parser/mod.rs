//! Template parser.
//!
//! Drives compilation of one unit: walks the tokens produced by the template
//! tokenizer and writes code for each of them into an
//! [`OutputBuffer`](crate::buffer::OutputBuffer).
//!
//! ## Structure
//!
//! - `parser` - [`TemplateParser`], the token walker and the utilities tag
//!   plugins build on
//! - `expression` - the [`ExpressionParser`] trait external parsers plug in
//!   through
//! - `preparsed` - [`PreparsedExpressions`], an expression parser serving
//!   trees parsed ahead of time
//! - `tags` - the [`TagCompiler`] plugin trait and the [`TagRegistry`]
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use vellum_compiler::ast::identifier;
//! use vellum_compiler::buffer::OutputBuffer;
//! use vellum_compiler::config::{BufferOptions, ParserOptions};
//! use vellum_compiler::lexer::Token;
//! use vellum_compiler::parser::{PreparsedExpressions, TagRegistry, TemplateParser};
//!
//! let mut expressions = PreparsedExpressions::new();
//! expressions.insert("user", identifier("user"));
//!
//! let mut parser = TemplateParser::new(
//!     Arc::new(TagRegistry::new()),
//!     Arc::new(expressions),
//!     ParserOptions::default(),
//! );
//! let token: Token = serde_json::from_str(
//!     r#"{ "type": "s__mustache", "properties": { "jsArg": "user" },
//!          "loc": { "start": { "line": 1, "col": 3 }, "end": { "line": 1, "col": 7 } },
//!          "filename": "eval.edge" }"#,
//! ).unwrap();
//!
//! let mut buffer = OutputBuffer::new("eval.edge", BufferOptions::default());
//! parser.process_token(&token, &mut buffer).unwrap();
//! assert!(buffer.flush().contains("out += `${state.user}`;"));
//! ```

mod expression;
#[allow(clippy::module_inception)]
mod parser;
mod preparsed;
mod tags;

pub use expression::{ExpressionParser, ParseFailure};
pub use parser::TemplateParser;
pub use preparsed::{PreparsedEntry, PreparsedExpressions};
pub use tags::{TagCompiler, TagRegistry};
