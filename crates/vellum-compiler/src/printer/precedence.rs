//! Binding strength of expression nodes.

use crate::ast::{BinaryOperator, LogicalOperator, Node};

pub(super) const SEQUENCE: u8 = 1;
pub(super) const ASSIGNMENT: u8 = 2;
pub(super) const CONDITIONAL: u8 = 3;
pub(super) const UNARY: u8 = 16;
pub(super) const MEMBER: u8 = 19;
pub(super) const PRIMARY: u8 = 20;

/// How tightly `node` binds; a child printed where a higher value is
/// required gets parenthesized.
pub(super) fn precedence(node: &Node) -> u8 {
    match node {
        Node::SequenceExpression(_) => SEQUENCE,
        Node::ArrowFunctionExpression(_)
        | Node::AssignmentExpression(_)
        | Node::SpreadElement(_)
        | Node::AssignmentPattern(_)
        | Node::RestElement(_) => ASSIGNMENT,
        Node::ConditionalExpression(_) => CONDITIONAL,
        Node::LogicalExpression(logical) => logical.operator.precedence(),
        Node::BinaryExpression(bin) => bin.operator.precedence(),
        Node::UnaryExpression(_) | Node::AwaitExpression(_) => UNARY,
        Node::CallExpression(_)
        | Node::NewExpression(_)
        | Node::MemberExpression(_)
        | Node::ChainExpression(_) => MEMBER,
        _ => PRIMARY,
    }
}

/// `??` cannot be mixed with `||` or `&&` without parentheses.
pub(super) fn mixes_nullish(parent: LogicalOperator, child: &Node) -> bool {
    let Node::LogicalExpression(child) = child else {
        return false;
    };
    (parent == LogicalOperator::NullishCoalescing) != (child.operator == LogicalOperator::NullishCoalescing)
}

/// The left operand of `**` cannot be a bare unary or await expression.
pub(super) fn needs_exponent_parens(operator: BinaryOperator, left: &Node) -> bool {
    operator == BinaryOperator::Exponent
        && matches!(left, Node::UnaryExpression(_) | Node::AwaitExpression(_))
}

/// An optional chain used as an object or callee keeps its parentheses so
/// the short-circuit ends where the source ended it.
pub(super) fn is_optional_chain(node: &Node) -> bool {
    matches!(node, Node::ChainExpression(_))
}

/// True when a call sits in the object chain of `node`, so that using it as
/// a `new` target would change meaning.
pub(super) fn has_call_in_chain(node: &Node) -> bool {
    match node {
        Node::CallExpression(_) => true,
        Node::MemberExpression(member) => has_call_in_chain(&member.object),
        Node::ChainExpression(chain) => has_call_in_chain(&chain.expression),
        _ => false,
    }
}
