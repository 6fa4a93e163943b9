//! Constructors for the synthetic nodes the compiler splices into trees.

use super::{
    CallExpression, Identifier, Literal, LiteralValue, MemberExpression, Node,
};
use crate::config::CallPath;

/// A bare identifier without location.
pub fn identifier(name: impl Into<String>) -> Node {
    Node::Identifier(Identifier {
        name: name.into(),
        loc: None,
    })
}

/// A string literal; printed with JSON quoting.
pub fn string_literal(value: impl Into<String>) -> Node {
    Node::Literal(Literal {
        value: LiteralValue::String(value.into()),
        raw: None,
        regex: None,
        bigint: None,
        loc: None,
    })
}

/// Builds `<object_name>.<property>`.
///
/// The accessor takes over the property's location so errors raised on the
/// rewritten node still point at the template source.
pub fn make_member_accessor(object_name: &str, property: Node) -> Node {
    let loc = property.loc().copied();
    Node::MemberExpression(MemberExpression {
        object: Box::new(identifier(object_name)),
        property: Box::new(property),
        computed: false,
        optional: false,
        loc,
    })
}

/// Builds a call to `name(args)` or `object.method(args)`.
pub fn make_callable(path: &CallPath, arguments: Vec<Node>) -> Node {
    let callee = match path {
        CallPath::Function(name) => identifier(name.as_str()),
        CallPath::Method(object, method) => Node::MemberExpression(MemberExpression {
            object: Box::new(identifier(object.as_str())),
            property: Box::new(identifier(method.as_str())),
            computed: false,
            optional: false,
            loc: None,
        }),
    };
    let loc = arguments.first().and_then(Node::loc).copied();

    Node::CallExpression(CallExpression {
        callee: Box::new(callee),
        arguments,
        optional: false,
        loc,
    })
}

/// Alias of [`make_callable`] used for the escape function.
pub fn make_escape_callable(path: &CallPath, arguments: Vec<Node>) -> Node {
    make_callable(path, arguments)
}

/// Alias of [`make_member_accessor`] used for state lookups.
pub fn make_state_property_accessor(state_name: &str, property: Node) -> Node {
    make_member_accessor(state_name, property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Loc;

    #[test]
    fn test_member_accessor_inherits_location() {
        let property = Node::Identifier(Identifier {
            name: "age".into(),
            loc: Some(Loc::at(2, 5)),
        });
        let node = make_member_accessor("state", property);
        let Node::MemberExpression(member) = &node else {
            panic!("expected member expression");
        };
        assert_eq!(member.object.as_identifier(), Some("state"));
        assert_eq!(member.property.as_identifier(), Some("age"));
        assert!(!member.computed);
        assert_eq!(node.loc(), Some(&Loc::at(2, 5)));
    }

    #[test]
    fn test_callable_with_method_path() {
        let call = make_callable(
            &CallPath::Method("ctx".into(), "escape".into()),
            vec![identifier("x")],
        );
        let Node::CallExpression(call) = call else {
            panic!("expected call expression");
        };
        let Node::MemberExpression(callee) = call.callee.as_ref() else {
            panic!("expected member callee");
        };
        assert_eq!(callee.object.as_identifier(), Some("ctx"));
        assert_eq!(callee.property.as_identifier(), Some("escape"));
        assert_eq!(call.arguments.len(), 1);
    }

    #[test]
    fn test_callable_with_function_path() {
        let call = make_callable(&CallPath::Function("escape".into()), vec![]);
        let Node::CallExpression(call) = call else {
            panic!("expected call expression");
        };
        assert_eq!(call.callee.as_identifier(), Some("escape"));
    }
}
