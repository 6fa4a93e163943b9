//! Rewrite rules for statements found in arrow function bodies.

use super::{RewriteContext, transform_ast};
use crate::ast::{BlockStatement, Node, ReturnStatement};
use crate::error::Result;

pub(super) fn rewrite_block(
    mut block: BlockStatement,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    block.body = block
        .body
        .into_iter()
        .map(|stmt| transform_ast(stmt, filename, ctx))
        .collect::<Result<_>>()?;
    Ok(Node::BlockStatement(block))
}

pub(super) fn rewrite_return(
    mut stmt: ReturnStatement,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    if let Some(argument) = stmt.argument.take() {
        stmt.argument = Some(Box::new(transform_ast(*argument, filename, ctx)?));
    }
    Ok(Node::ReturnStatement(stmt))
}
