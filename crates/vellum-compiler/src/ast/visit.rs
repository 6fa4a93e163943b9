//! Tree walking over node locations.

use super::{Loc, Node};

impl Node {
    /// Calls `f` on the location of this node and of every node below it.
    pub fn for_each_loc_mut(&mut self, f: &mut dyn FnMut(&mut Loc)) {
        if let Some(loc) = self.loc_slot() {
            f(loc);
        }

        match self {
            Node::Identifier(_) | Node::Literal(_) | Node::ThisExpression(_) | Node::Other(_) => {}
            Node::ArrayExpression(array) => walk_optional(&mut array.elements, f),
            Node::ArrayPattern(pattern) => walk_optional(&mut pattern.elements, f),
            Node::ObjectExpression(object) => walk_all(&mut object.properties, f),
            Node::ObjectPattern(pattern) => walk_all(&mut pattern.properties, f),
            Node::Property(property) => {
                property.key.for_each_loc_mut(f);
                property.value.for_each_loc_mut(f);
            }
            Node::FunctionDeclaration(function) => {
                if let Some(loc) = function.id.as_mut().and_then(|id| id.loc.as_mut()) {
                    f(loc);
                }
                walk_all(&mut function.params, f);
                function.body.for_each_loc_mut(f);
            }
            Node::ArrowFunctionExpression(arrow) => {
                walk_all(&mut arrow.params, f);
                arrow.body.for_each_loc_mut(f);
            }
            Node::UnaryExpression(unary) => unary.argument.for_each_loc_mut(f),
            Node::AwaitExpression(expr) => expr.argument.for_each_loc_mut(f),
            Node::SpreadElement(spread) => spread.argument.for_each_loc_mut(f),
            Node::RestElement(rest) => rest.argument.for_each_loc_mut(f),
            Node::ChainExpression(chain) => chain.expression.for_each_loc_mut(f),
            Node::ExpressionStatement(stmt) => stmt.expression.for_each_loc_mut(f),
            Node::ReturnStatement(stmt) => {
                if let Some(argument) = stmt.argument.as_mut() {
                    argument.for_each_loc_mut(f);
                }
            }
            Node::BinaryExpression(bin) => {
                bin.left.for_each_loc_mut(f);
                bin.right.for_each_loc_mut(f);
            }
            Node::LogicalExpression(logical) => {
                logical.left.for_each_loc_mut(f);
                logical.right.for_each_loc_mut(f);
            }
            Node::AssignmentExpression(assign) => {
                assign.left.for_each_loc_mut(f);
                assign.right.for_each_loc_mut(f);
            }
            Node::AssignmentPattern(pattern) => {
                pattern.left.for_each_loc_mut(f);
                pattern.right.for_each_loc_mut(f);
            }
            Node::ConditionalExpression(cond) => {
                cond.test.for_each_loc_mut(f);
                cond.consequent.for_each_loc_mut(f);
                cond.alternate.for_each_loc_mut(f);
            }
            Node::CallExpression(call) => {
                call.callee.for_each_loc_mut(f);
                walk_all(&mut call.arguments, f);
            }
            Node::NewExpression(new) => {
                new.callee.for_each_loc_mut(f);
                walk_all(&mut new.arguments, f);
            }
            Node::MemberExpression(member) => {
                member.object.for_each_loc_mut(f);
                member.property.for_each_loc_mut(f);
            }
            Node::SequenceExpression(seq) => walk_all(&mut seq.expressions, f),
            Node::TemplateLiteral(template) => {
                for quasi in &mut template.quasis {
                    if let Some(loc) = quasi.loc.as_mut() {
                        f(loc);
                    }
                }
                walk_all(&mut template.expressions, f);
            }
            Node::BlockStatement(block) => walk_all(&mut block.body, f),
        }
    }
}

fn walk_all(nodes: &mut [Node], f: &mut dyn FnMut(&mut Loc)) {
    for node in nodes {
        node.for_each_loc_mut(f);
    }
}

fn walk_optional(nodes: &mut [Option<Node>], f: &mut dyn FnMut(&mut Loc)) {
    for node in nodes.iter_mut().flatten() {
        node.for_each_loc_mut(f);
    }
}
