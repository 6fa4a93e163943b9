//! Expression rewriting.
//!
//! This module contains the pass that takes a parsed expression tree and
//! resolves every free identifier: names bound by an enclosing arrow function,
//! declared for the unit or known as runtime globals are left alone, every
//! other name becomes a lookup on the state object (`name` to `state.name`).
//!
//! The pass consumes the tree and hands back the rebuilt one. Node kinds the
//! pass has no rule for are rejected with their template location.

mod expressions;
mod scope;
mod statements;


pub use scope::{ScopeFrame, ScopeGuard, ScopeSnapshot, ScopeStack};

use rustc_hash::FxHashSet;

use crate::ast::{ArrayPattern, Loc, Node, ObjectPattern, SourceLocation};
use crate::config::ParserOptions;
use crate::error::{CompileError, Result};

/// Everything a rewrite needs to know about the unit being compiled.
#[derive(Debug)]
pub struct RewriteContext<'a> {
    /// Names bound by enclosing constructs
    pub stack: &'a mut ScopeStack,
    /// Names declared for the whole unit
    pub local_variables: &'a [String],
    /// Names that exist at runtime
    pub globals: &'a FxHashSet<String>,
    /// Object free identifiers are looked up on
    pub state_property_name: &'a str,
    /// Whether `await` is allowed
    pub async_mode: bool,
}

impl<'a> RewriteContext<'a> {
    /// Creates a context reading its settings from `options`.
    pub fn new(stack: &'a mut ScopeStack, options: &'a ParserOptions) -> Self {
        Self {
            stack,
            local_variables: &options.local_variables,
            globals: &options.globals,
            state_property_name: &options.state_property_name,
            async_mode: options.async_mode,
        }
    }

    /// Returns true when `name` must not be rewritten.
    pub fn is_known(&self, name: &str) -> bool {
        self.local_variables.iter().any(|local| local == name)
            || self.stack.contains(name)
            || self.globals.contains(name)
    }
}

/// Rewrites `node` and everything below it.
///
/// `filename` is only used for error locations.
pub fn transform_ast(node: Node, filename: &str, ctx: &mut RewriteContext<'_>) -> Result<Node> {
    match node {
        Node::Identifier(id) => Ok(expressions::rewrite_identifier(id, ctx)),
        Node::MemberExpression(member) => expressions::rewrite_member(member, filename, ctx),
        Node::CallExpression(call) => expressions::rewrite_call(call, filename, ctx),
        Node::NewExpression(new) => expressions::rewrite_new(new, filename, ctx),
        Node::ArrowFunctionExpression(arrow) => expressions::rewrite_arrow(arrow, filename, ctx),
        Node::ArrayExpression(array) => expressions::rewrite_array(array, filename, ctx),
        Node::ObjectExpression(object) => expressions::rewrite_object(object, filename, ctx),
        Node::BinaryExpression(bin) => expressions::rewrite_binary(bin, filename, ctx),
        Node::LogicalExpression(logical) => expressions::rewrite_logical(logical, filename, ctx),
        Node::AssignmentExpression(assign) => {
            expressions::rewrite_assignment(assign, filename, ctx)
        }
        Node::ConditionalExpression(cond) => expressions::rewrite_conditional(cond, filename, ctx),
        Node::SequenceExpression(seq) => expressions::rewrite_sequence(seq, filename, ctx),
        Node::TemplateLiteral(template) => expressions::rewrite_template(template, filename, ctx),
        Node::UnaryExpression(unary) => expressions::rewrite_unary(unary, filename, ctx),
        Node::SpreadElement(spread) => expressions::rewrite_spread(spread, filename, ctx),
        Node::ChainExpression(chain) => expressions::rewrite_chain(chain, filename, ctx),
        Node::AwaitExpression(expr) => expressions::rewrite_await(expr, filename, ctx),
        Node::BlockStatement(block) => statements::rewrite_block(block, filename, ctx),
        Node::ReturnStatement(stmt) => statements::rewrite_return(stmt, filename, ctx),
        Node::ExpressionStatement(stmt) => transform_ast(*stmt.expression, filename, ctx),
        node @ (Node::Literal(_) | Node::ThisExpression(_) | Node::FunctionDeclaration(_)) => {
            Ok(node)
        }
        node @ (Node::Property(_)
        | Node::ObjectPattern(_)
        | Node::ArrayPattern(_)
        | Node::AssignmentPattern(_)
        | Node::RestElement(_)
        | Node::Other(_)) => Err(CompileError::UnsupportedNode {
            kind: node.kind().to_string(),
            location: expression_location(&node, filename),
        }),
    }
}

/// The template location of `node`.
///
/// Falls back to the property of a member expression when the node itself
/// has no location, and to line 0 when neither has one.
pub fn expression_location(node: &Node, filename: &str) -> SourceLocation {
    let loc = node.loc().or_else(|| match node {
        Node::MemberExpression(member) => member.property.loc(),
        _ => None,
    });
    location_of(loc, filename)
}

pub(crate) fn location_of(loc: Option<&Loc>, filename: &str) -> SourceLocation {
    match loc {
        Some(loc) => SourceLocation::new(loc.start.line, loc.start.column, filename),
        None => SourceLocation::new(0, 0, filename),
    }
}

/// Names bound by an object destructuring pattern.
///
/// Only `{ a, b: c }` forms are accepted; nested patterns, defaults and rest
/// elements are rejected.
pub fn collect_object_pattern_names(pattern: &ObjectPattern, filename: &str) -> Result<Vec<String>> {
    pattern
        .properties
        .iter()
        .map(|member| match member {
            Node::Property(property) => property.value.as_identifier().map(str::to_string),
            _ => None,
        })
        .map(|name| {
            name.ok_or_else(|| CompileError::InvalidDestructuring {
                pattern: "Object",
                location: location_of(pattern.loc.as_ref(), filename),
            })
        })
        .collect()
}

/// Names bound by an array destructuring pattern. Holes bind nothing.
pub fn collect_array_pattern_names(pattern: &ArrayPattern, filename: &str) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(pattern.elements.len());
    for element in pattern.elements.iter().flatten() {
        match element.as_identifier() {
            Some(name) => names.push(name.to_string()),
            None => {
                return Err(CompileError::InvalidDestructuring {
                    pattern: "Array",
                    location: location_of(pattern.loc.as_ref(), filename),
                });
            }
        }
    }
    Ok(names)
}
