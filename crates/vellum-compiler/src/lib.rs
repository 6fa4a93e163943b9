// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # vellum-compiler
//!
//! The compile stage of a template engine: turns tokenized templates into
//! JavaScript render functions.
//!
//! ## Overview
//!
//! This crate provides:
//! - A scope-aware rewriter for ESTree expression trees that resolves free
//!   identifiers against a state object
//! - A template parser dispatching tokens to tag plugins and interpolation
//!   handling
//! - An output buffer emitting instrumented code with file and line
//!   tracking inside a recoverable `try/catch`
//! - A JavaScript printer for rewritten trees
//! - Parallel and async batch compilation of independent units
//!
//! Template tokenizing and expression parsing happen outside this crate. Their
//! results come in through the [`lexer::Tokenizer`] and
//! [`parser::ExpressionParser`] traits, or as JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use vellum_compiler::{BufferOptions, CompileUnit, TagRegistry};
//!
//! let unit = CompileUnit::from_json(r#"{
//!     "filename": "hello.edge",
//!     "tokens": [
//!         { "type": "raw", "value": "Hello ", "line": 1, "filename": "hello.edge" },
//!         { "type": "mustache", "filename": "hello.edge", "properties": { "jsArg": "name" },
//!           "loc": { "start": { "line": 1, "col": 8 }, "end": { "line": 1, "col": 12 } } }
//!     ],
//!     "expressions": {
//!         "name": { "ast": { "type": "ExpressionStatement",
//!                            "expression": { "type": "Identifier", "name": "name" } } }
//!     }
//! }"#).unwrap();
//!
//! let compiled = unit.compile(Arc::new(TagRegistry::new())).unwrap();
//! assert!(compiled.code.contains("out += `${ctx.escape(state.name)}`;"));
//! # let _ = BufferOptions::default();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod batch;
pub mod buffer;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod rewrite;

// Re-exports for convenience
pub use ast::{Node, SourceLocation};
#[cfg(feature = "async")]
pub use batch::AsyncCompiler;
#[cfg(feature = "parallel")]
pub use batch::ParallelCompiler;
pub use batch::{CompileUnit, CompiledUnit, UnitError};
pub use buffer::OutputBuffer;
pub use config::{BufferOptions, BufferOverrides, CallPath, ParserOptions};
pub use error::{CompileError, Result};
pub use lexer::{Token, Tokenizer};
pub use parser::{ExpressionParser, PreparsedExpressions, TagCompiler, TagRegistry, TemplateParser};
pub use printer::{JsPrinter, Printer};
pub use rewrite::ScopeStack;
