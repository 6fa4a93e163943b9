//! Rewrite rules for expression nodes.

use tracing::trace;

use super::{
    RewriteContext, collect_array_pattern_names, collect_object_pattern_names,
    expression_location, transform_ast,
};
use crate::ast::{
    ArrayExpression, ArrowFunctionExpression, AssignmentExpression, AwaitExpression,
    BinaryExpression, CallExpression, ChainExpression, ConditionalExpression, Identifier,
    LogicalExpression, MemberExpression, NewExpression, Node, ObjectExpression,
    SequenceExpression, SpreadElement, TemplateLiteral, UnaryExpression,
    make_state_property_accessor,
};
use crate::error::{CompileError, Result};

fn rewrite_boxed(node: Box<Node>, filename: &str, ctx: &mut RewriteContext<'_>) -> Result<Box<Node>> {
    transform_ast(*node, filename, ctx).map(Box::new)
}

fn rewrite_all(nodes: Vec<Node>, filename: &str, ctx: &mut RewriteContext<'_>) -> Result<Vec<Node>> {
    nodes
        .into_iter()
        .map(|node| transform_ast(node, filename, ctx))
        .collect()
}

pub(super) fn rewrite_identifier(id: Identifier, ctx: &RewriteContext<'_>) -> Node {
    if ctx.is_known(&id.name) {
        return Node::Identifier(id);
    }
    trace!(name = %id.name, state = ctx.state_property_name, "resolving identifier on state");
    make_state_property_accessor(ctx.state_property_name, Node::Identifier(id))
}

pub(super) fn rewrite_member(
    mut member: MemberExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    member.object = rewrite_boxed(member.object, filename, ctx)?;
    if member.computed || member.property.as_identifier().is_none() {
        member.property = rewrite_boxed(member.property, filename, ctx)?;
    }
    Ok(Node::MemberExpression(member))
}

pub(super) fn rewrite_call(
    mut call: CallExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    call.callee = rewrite_boxed(call.callee, filename, ctx)?;
    call.arguments = rewrite_all(call.arguments, filename, ctx)?;
    Ok(Node::CallExpression(call))
}

// The constructor is looked up as written: `new Date()` stays `new Date()`.
pub(super) fn rewrite_new(
    mut new: NewExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    new.arguments = rewrite_all(new.arguments, filename, ctx)?;
    Ok(Node::NewExpression(new))
}

pub(super) fn rewrite_arrow(
    mut arrow: ArrowFunctionExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    let mut scope = ctx.stack.enter();

    for param in &arrow.params {
        match param {
            Node::Identifier(id) => scope.declare(id.name.as_str()),
            Node::ObjectPattern(pattern) => {
                for name in collect_object_pattern_names(pattern, filename)? {
                    scope.declare(name);
                }
            }
            Node::ArrayPattern(pattern) => {
                for name in collect_array_pattern_names(pattern, filename)? {
                    scope.declare(name);
                }
            }
            other => {
                return Err(CompileError::UnexpectedParameterShape {
                    kind: other.kind().to_string(),
                    location: expression_location(other, filename),
                });
            }
        }
    }

    let mut inner = RewriteContext {
        stack: &mut *scope,
        local_variables: ctx.local_variables,
        globals: ctx.globals,
        state_property_name: ctx.state_property_name,
        async_mode: ctx.async_mode,
    };
    arrow.body = rewrite_boxed(arrow.body, filename, &mut inner)?;
    Ok(Node::ArrowFunctionExpression(arrow))
}

pub(super) fn rewrite_array(
    mut array: ArrayExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    array.elements = array
        .elements
        .into_iter()
        .map(|element| {
            element
                .map(|node| transform_ast(node, filename, ctx))
                .transpose()
        })
        .collect::<Result<_>>()?;
    Ok(Node::ArrayExpression(array))
}

pub(super) fn rewrite_object(
    mut object: ObjectExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    let mut properties = Vec::with_capacity(object.properties.len());
    for member in object.properties {
        match member {
            Node::Property(mut property) => {
                property.shorthand = false;
                if property.computed {
                    property.key = rewrite_boxed(property.key, filename, ctx)?;
                }
                property.value = rewrite_boxed(property.value, filename, ctx)?;
                properties.push(Node::Property(property));
            }
            Node::SpreadElement(spread) => {
                properties.push(rewrite_spread(spread, filename, ctx)?);
            }
            other => {
                return Err(CompileError::UnexpectedObjectProperty {
                    kind: other.kind().to_string(),
                    location: expression_location(&other, filename),
                });
            }
        }
    }
    object.properties = properties;
    Ok(Node::ObjectExpression(object))
}

pub(super) fn rewrite_binary(
    mut bin: BinaryExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    bin.left = rewrite_boxed(bin.left, filename, ctx)?;
    bin.right = rewrite_boxed(bin.right, filename, ctx)?;
    Ok(Node::BinaryExpression(bin))
}

pub(super) fn rewrite_logical(
    mut logical: LogicalExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    logical.left = rewrite_boxed(logical.left, filename, ctx)?;
    logical.right = rewrite_boxed(logical.right, filename, ctx)?;
    Ok(Node::LogicalExpression(logical))
}

pub(super) fn rewrite_assignment(
    mut assign: AssignmentExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    assign.left = rewrite_boxed(assign.left, filename, ctx)?;
    assign.right = rewrite_boxed(assign.right, filename, ctx)?;
    Ok(Node::AssignmentExpression(assign))
}

pub(super) fn rewrite_conditional(
    mut cond: ConditionalExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    cond.test = rewrite_boxed(cond.test, filename, ctx)?;
    cond.consequent = rewrite_boxed(cond.consequent, filename, ctx)?;
    cond.alternate = rewrite_boxed(cond.alternate, filename, ctx)?;
    Ok(Node::ConditionalExpression(cond))
}

pub(super) fn rewrite_sequence(
    mut seq: SequenceExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    seq.expressions = rewrite_all(seq.expressions, filename, ctx)?;
    Ok(Node::SequenceExpression(seq))
}

pub(super) fn rewrite_template(
    mut template: TemplateLiteral,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    template.expressions = rewrite_all(template.expressions, filename, ctx)?;
    Ok(Node::TemplateLiteral(template))
}

pub(super) fn rewrite_unary(
    mut unary: UnaryExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    unary.argument = rewrite_boxed(unary.argument, filename, ctx)?;
    Ok(Node::UnaryExpression(unary))
}

pub(super) fn rewrite_spread(
    mut spread: SpreadElement,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    spread.argument = rewrite_boxed(spread.argument, filename, ctx)?;
    Ok(Node::SpreadElement(spread))
}

pub(super) fn rewrite_chain(
    mut chain: ChainExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    chain.expression = rewrite_boxed(chain.expression, filename, ctx)?;
    Ok(Node::ChainExpression(chain))
}

pub(super) fn rewrite_await(
    mut expr: AwaitExpression,
    filename: &str,
    ctx: &mut RewriteContext<'_>,
) -> Result<Node> {
    if !ctx.async_mode {
        return Err(CompileError::AwaitNotAllowed {
            location: super::location_of(expr.loc.as_ref(), filename),
        });
    }
    expr.argument = rewrite_boxed(expr.argument, filename, ctx)?;
    Ok(Node::AwaitExpression(expr))
}
