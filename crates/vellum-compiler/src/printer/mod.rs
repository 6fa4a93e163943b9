//! Turning expression trees back into JavaScript source.
//!
//! The compiler only needs a [`Printer`]; [`JsPrinter`] is the default
//! implementation. Output is compact: expressions stay on one line, block
//! bodies get one statement per line.
//!
//! Parentheses are inserted from operator precedence alone, so a tree printed
//! and parsed again has the same shape even when the original source had
//! redundant parentheses.

mod precedence;

use std::fmt::Write as _;

use crate::ast::{
    ArrowFunctionExpression, FunctionDeclaration, Literal, LiteralValue, Node, Property,
    PropertyKind, TemplateLiteral,
};
use precedence::{
    ASSIGNMENT, CONDITIONAL, MEMBER, PRIMARY, SEQUENCE, UNARY, has_call_in_chain, is_optional_chain,
    mixes_nullish, needs_exponent_parens, precedence,
};

/// Prints expression trees as source text.
pub trait Printer: Send + Sync {
    /// Prints `node`.
    fn print(&self, node: &Node) -> String;
}

/// Default printer for ESTree expression trees.
#[derive(Debug, Clone)]
pub struct JsPrinter {
    indent: String,
}

impl JsPrinter {
    /// Creates a printer indenting blocks with two spaces.
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    /// Creates a printer with a custom indentation unit.
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }
}

impl Default for JsPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer for JsPrinter {
    fn print(&self, node: &Node) -> String {
        let mut emitter = Emitter {
            out: String::new(),
            indent: &self.indent,
            level: 0,
        };
        emitter.node(node);
        emitter.out
    }
}

struct Emitter<'p> {
    out: String,
    indent: &'p str,
    level: usize,
}

impl Emitter<'_> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.level {
            self.out.push_str(self.indent);
        }
    }

    /// Prints a root node: statements as statements, anything else as an
    /// expression.
    fn node(&mut self, node: &Node) {
        match node {
            Node::BlockStatement(_)
            | Node::ExpressionStatement(_)
            | Node::ReturnStatement(_)
            | Node::FunctionDeclaration(_) => self.statement(node),
            _ => self.expression(node, SEQUENCE),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, node: &Node) {
        match node {
            Node::BlockStatement(block) => self.block(&block.body),
            Node::ExpressionStatement(stmt) => self.expression_statement(&stmt.expression),
            Node::ReturnStatement(stmt) => match &stmt.argument {
                Some(argument) => {
                    self.push("return ");
                    self.expression(argument, SEQUENCE);
                    self.push(";");
                }
                None => self.push("return;"),
            },
            Node::FunctionDeclaration(function) => self.function(function),
            // Rewriting unwraps expression statements
            expression => self.expression_statement(expression),
        }
    }

    fn expression_statement(&mut self, expression: &Node) {
        let starts_ambiguously = matches!(
            expression,
            Node::ObjectExpression(_) | Node::ObjectPattern(_)
        );
        if starts_ambiguously {
            self.push("(");
            self.expression(expression, SEQUENCE);
            self.push(");");
        } else {
            self.expression(expression, SEQUENCE);
            self.push(";");
        }
    }

    fn block(&mut self, body: &[Node]) {
        if body.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.level += 1;
        for stmt in body {
            self.newline();
            self.statement(stmt);
        }
        self.level -= 1;
        self.newline();
        self.push("}");
    }

    fn function(&mut self, function: &FunctionDeclaration) {
        if function.is_async {
            self.push("async ");
        }
        self.push("function");
        if function.generator {
            self.push("*");
        }
        if let Some(id) = &function.id {
            self.push(" ");
            self.push(&id.name);
        }
        self.push("(");
        self.comma_separated(&function.params, ASSIGNMENT);
        self.push(") ");
        self.statement(&function.body);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Prints `node`, parenthesized when it binds looser than `min`.
    fn expression(&mut self, node: &Node, min: u8) {
        if precedence(node) < min {
            self.push("(");
            self.expression_inner(node);
            self.push(")");
        } else {
            self.expression_inner(node);
        }
    }

    fn parenthesized(&mut self, node: &Node) {
        self.push("(");
        self.expression(node, SEQUENCE);
        self.push(")");
    }

    fn expression_inner(&mut self, node: &Node) {
        match node {
            Node::Identifier(id) => self.push(&id.name),
            Node::Literal(literal) => self.literal(literal),
            Node::ThisExpression(_) => self.push("this"),
            Node::ArrayExpression(array) => self.elements(&array.elements),
            Node::ArrayPattern(pattern) => self.elements(&pattern.elements),
            Node::ObjectExpression(object) => self.members(&object.properties),
            Node::ObjectPattern(pattern) => self.members(&pattern.properties),
            Node::Property(property) => self.property(property),
            Node::TemplateLiteral(template) => self.template(template),
            Node::ArrowFunctionExpression(arrow) => self.arrow(arrow),
            Node::FunctionDeclaration(function) => self.function(function),
            Node::SequenceExpression(seq) => self.comma_separated(&seq.expressions, ASSIGNMENT),
            Node::AssignmentExpression(assign) => {
                self.expression(&assign.left, CONDITIONAL);
                let _ = write!(self.out, " {} ", assign.operator);
                self.expression(&assign.right, ASSIGNMENT);
            }
            Node::AssignmentPattern(pattern) => {
                self.expression(&pattern.left, CONDITIONAL);
                self.push(" = ");
                self.expression(&pattern.right, ASSIGNMENT);
            }
            Node::ConditionalExpression(cond) => {
                self.expression(&cond.test, CONDITIONAL + 1);
                self.push(" ? ");
                self.expression(&cond.consequent, ASSIGNMENT);
                self.push(" : ");
                self.expression(&cond.alternate, ASSIGNMENT);
            }
            Node::LogicalExpression(logical) => {
                let prec = logical.operator.precedence();
                self.logical_operand(&logical.left, logical.operator, prec);
                let _ = write!(self.out, " {} ", logical.operator);
                self.logical_operand(&logical.right, logical.operator, prec + 1);
            }
            Node::BinaryExpression(bin) => {
                let prec = bin.operator.precedence();
                let (left_min, right_min) = if bin.operator.is_right_associative() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                if needs_exponent_parens(bin.operator, &bin.left) {
                    self.parenthesized(&bin.left);
                } else {
                    self.expression(&bin.left, left_min);
                }
                let _ = write!(self.out, " {} ", bin.operator);
                self.expression(&bin.right, right_min);
            }
            Node::UnaryExpression(unary) => {
                self.push(unary.operator.as_str());
                let operator = unary.operator.as_str();
                let doubled = matches!(
                    unary.argument.as_ref(),
                    Node::UnaryExpression(inner) if inner.operator.as_str() == operator
                        && (operator == "-" || operator == "+")
                );
                if unary.operator.is_keyword() || doubled {
                    self.push(" ");
                }
                self.expression(&unary.argument, UNARY);
            }
            Node::AwaitExpression(expr) => {
                self.push("await ");
                self.expression(&expr.argument, UNARY);
            }
            Node::SpreadElement(spread) => {
                self.push("...");
                self.expression(&spread.argument, ASSIGNMENT);
            }
            Node::RestElement(rest) => {
                self.push("...");
                self.expression(&rest.argument, ASSIGNMENT);
            }
            Node::CallExpression(call) => {
                if is_optional_chain(&call.callee) {
                    self.parenthesized(&call.callee);
                } else {
                    self.expression(&call.callee, MEMBER);
                }
                if call.optional {
                    self.push("?.");
                }
                self.arguments(&call.arguments);
            }
            Node::NewExpression(new) => {
                self.push("new ");
                if has_call_in_chain(&new.callee) || is_optional_chain(&new.callee) {
                    self.parenthesized(&new.callee);
                } else {
                    self.expression(&new.callee, MEMBER);
                }
                self.arguments(&new.arguments);
            }
            Node::MemberExpression(member) => {
                let integer_object = matches!(
                    member.object.as_ref(),
                    Node::Literal(Literal { value: LiteralValue::Number(_), raw, .. })
                        if !member.computed && raw.as_deref().is_none_or(|raw| !raw.contains('.'))
                );
                if integer_object || is_optional_chain(&member.object) {
                    self.parenthesized(&member.object);
                } else {
                    self.expression(&member.object, MEMBER);
                }
                if member.computed {
                    self.push(if member.optional { "?.[" } else { "[" });
                    self.expression(&member.property, SEQUENCE);
                    self.push("]");
                } else {
                    self.push(if member.optional { "?." } else { "." });
                    self.expression(&member.property, PRIMARY);
                }
            }
            Node::ChainExpression(chain) => self.expression_inner(&chain.expression),
            Node::BlockStatement(_) | Node::ExpressionStatement(_) | Node::ReturnStatement(_) => {
                self.statement(node)
            }
            Node::Other(other) => {
                let _ = write!(self.out, "/* {} */", other.kind);
            }
        }
    }

    fn logical_operand(&mut self, operand: &Node, parent: crate::ast::LogicalOperator, min: u8) {
        if mixes_nullish(parent, operand) {
            self.parenthesized(operand);
        } else {
            self.expression(operand, min);
        }
    }

    fn comma_separated(&mut self, nodes: &[Node], min: u8) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expression(node, min);
        }
    }

    fn arguments(&mut self, arguments: &[Node]) {
        self.push("(");
        self.comma_separated(arguments, ASSIGNMENT);
        self.push(")");
    }

    fn elements(&mut self, elements: &[Option<Node>]) {
        self.push("[");
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Some(element) = element {
                self.expression(element, ASSIGNMENT);
            }
        }
        if matches!(elements.last(), Some(None)) {
            self.push(",");
        }
        self.push("]");
    }

    fn members(&mut self, members: &[Node]) {
        if members.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.comma_separated(members, ASSIGNMENT);
        self.push("}");
    }

    fn property(&mut self, property: &Property) {
        if property.shorthand {
            self.expression(&property.value, ASSIGNMENT);
            return;
        }
        match property.kind {
            PropertyKind::Get => self.push("get "),
            PropertyKind::Set => self.push("set "),
            PropertyKind::Init => {}
        }
        if property.computed {
            self.push("[");
            self.expression(&property.key, ASSIGNMENT);
            self.push("]");
        } else {
            self.expression(&property.key, PRIMARY);
        }
        self.push(": ");
        self.expression(&property.value, ASSIGNMENT);
    }

    fn template(&mut self, template: &TemplateLiteral) {
        self.push("`");
        for (i, quasi) in template.quasis.iter().enumerate() {
            self.push(&quasi.value.raw);
            if let Some(expression) = template.expressions.get(i) {
                self.push("${");
                self.expression(expression, SEQUENCE);
                self.push("}");
            }
        }
        self.push("`");
    }

    fn arrow(&mut self, arrow: &ArrowFunctionExpression) {
        if arrow.is_async {
            self.push("async ");
        }
        match arrow.params.as_slice() {
            [Node::Identifier(param)] => self.push(&param.name),
            params => {
                self.push("(");
                self.comma_separated(params, ASSIGNMENT);
                self.push(")");
            }
        }
        self.push(" => ");
        match arrow.body.as_ref() {
            Node::BlockStatement(block) => self.block(&block.body),
            body @ Node::ObjectExpression(_) => self.parenthesized(body),
            body => self.expression(body, ASSIGNMENT),
        }
    }

    fn literal(&mut self, literal: &Literal) {
        if let Some(raw) = &literal.raw {
            self.push(raw);
            return;
        }
        if let Some(regex) = &literal.regex {
            let _ = write!(self.out, "/{}/{}", regex.pattern, regex.flags);
            return;
        }
        if let Some(digits) = &literal.bigint {
            let _ = write!(self.out, "{digits}n");
            return;
        }
        match &literal.value {
            LiteralValue::Null => self.push("null"),
            LiteralValue::Boolean(value) => self.push(if *value { "true" } else { "false" }),
            LiteralValue::Number(value) => {
                let _ = write!(self.out, "{value}");
            }
            LiteralValue::String(value) => {
                let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
                self.push(&quoted);
            }
            LiteralValue::Opaque(value) => {
                let _ = write!(self.out, "{value}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn print(value: serde_json::Value) -> String {
        let node: Node = serde_json::from_value(value).unwrap();
        JsPrinter::new().print(&node)
    }

    fn id(name: &str) -> serde_json::Value {
        json!({ "type": "Identifier", "name": name })
    }

    fn num(raw: &str) -> serde_json::Value {
        json!({ "type": "Literal", "value": raw.parse::<f64>().unwrap(), "raw": raw })
    }

    fn binary(op: &str, left: serde_json::Value, right: serde_json::Value) -> serde_json::Value {
        json!({ "type": "BinaryExpression", "operator": op, "left": left, "right": right })
    }

    fn logical(op: &str, left: serde_json::Value, right: serde_json::Value) -> serde_json::Value {
        json!({ "type": "LogicalExpression", "operator": op, "left": left, "right": right })
    }

    #[test]
    fn test_member_and_call() {
        let node = json!({
            "type": "CallExpression",
            "callee": {
                "type": "MemberExpression",
                "object": id("ctx"),
                "property": id("escape"),
                "computed": false
            },
            "arguments": [{
                "type": "MemberExpression",
                "object": id("state"),
                "property": id("user"),
                "computed": true
            }]
        });
        assert_eq!(print(node), "ctx.escape(state[user])");
    }

    #[test]
    fn test_binary_precedence() {
        let sum = binary("+", id("a"), id("b"));
        assert_eq!(print(binary("*", sum.clone(), id("c"))), "(a + b) * c");
        assert_eq!(print(binary("+", id("c"), binary("*", id("a"), id("b")))), "c + a * b");
        assert_eq!(print(binary("-", id("a"), binary("-", id("b"), id("c")))), "a - (b - c)");
        assert_eq!(print(binary("-", binary("-", id("a"), id("b")), id("c"))), "a - b - c");
    }

    #[test]
    fn test_exponent_associativity() {
        let pow = binary("**", id("b"), id("c"));
        assert_eq!(print(binary("**", id("a"), pow.clone())), "a ** b ** c");
        assert_eq!(print(binary("**", pow, id("a"))), "(b ** c) ** a");

        let negated = json!({ "type": "UnaryExpression", "operator": "-", "prefix": true, "argument": id("a") });
        assert_eq!(print(binary("**", negated, num("2"))), "(-a) ** 2");
    }

    #[test]
    fn test_nullish_mixing() {
        let or = logical("||", id("a"), id("b"));
        assert_eq!(print(logical("??", or, id("c"))), "(a || b) ?? c");
        assert_eq!(print(logical("||", logical("&&", id("a"), id("b")), id("c"))), "a && b || c");
    }

    #[test]
    fn test_unary_spacing() {
        let typeof_x = json!({ "type": "UnaryExpression", "operator": "typeof", "argument": id("x") });
        assert_eq!(print(typeof_x), "typeof x");

        let neg = json!({ "type": "UnaryExpression", "operator": "-", "argument": id("x") });
        let double = json!({ "type": "UnaryExpression", "operator": "-", "argument": neg });
        assert_eq!(print(double), "- -x");
    }

    #[test]
    fn test_arrow_functions() {
        let single = json!({
            "type": "ArrowFunctionExpression",
            "params": [id("num")],
            "body": binary("===", binary("%", id("num"), num("2")), num("0")),
            "expression": true
        });
        assert_eq!(print(single), "num => num % 2 === 0");

        let object_body = json!({
            "type": "ArrowFunctionExpression",
            "params": [id("a"), id("b")],
            "body": {
                "type": "ObjectExpression",
                "properties": [{
                    "type": "Property", "key": id("a"), "value": id("b"),
                    "kind": "init", "computed": false, "shorthand": false, "method": false
                }]
            },
            "expression": true
        });
        assert_eq!(print(object_body), "(a, b) => ({a: b})");
    }

    #[test]
    fn test_block_body() {
        let node = json!({
            "type": "ArrowFunctionExpression",
            "params": [],
            "body": {
                "type": "BlockStatement",
                "body": [
                    { "type": "CallExpression", "callee": id("log"), "arguments": [] },
                    { "type": "ReturnStatement", "argument": id("x") }
                ]
            }
        });
        assert_eq!(print(node), "() => {\n  log();\n  return x;\n}");
    }

    #[test]
    fn test_template_literal() {
        let node = json!({
            "type": "TemplateLiteral",
            "quasis": [
                { "type": "TemplateElement", "value": { "raw": "Hello ", "cooked": "Hello " }, "tail": false },
                { "type": "TemplateElement", "value": { "raw": "!", "cooked": "!" }, "tail": true }
            ],
            "expressions": [id("name")]
        });
        assert_eq!(print(node), "`Hello ${name}!`");
    }

    #[test]
    fn test_array_holes() {
        let node = json!({ "type": "ArrayExpression", "elements": [id("a"), null, id("b"), null] });
        assert_eq!(print(node), "[a, , b, ,]");
    }

    #[test]
    fn test_literals_without_raw() {
        assert_eq!(print(json!({ "type": "Literal", "value": "say \"hi\"" })), r#""say \"hi\"""#);
        assert_eq!(print(json!({ "type": "Literal", "value": 1.5 })), "1.5");
        assert_eq!(print(json!({ "type": "Literal", "value": null })), "null");
    }

    #[test]
    fn test_optional_chain_and_new() {
        let chain = json!({
            "type": "ChainExpression",
            "expression": {
                "type": "MemberExpression",
                "object": id("user"),
                "property": id("profile"),
                "computed": false,
                "optional": true
            }
        });
        assert_eq!(print(chain), "user?.profile");

        let new = json!({
            "type": "NewExpression",
            "callee": { "type": "CallExpression", "callee": id("factory"), "arguments": [] },
            "arguments": [num("1")]
        });
        assert_eq!(print(new), "new (factory())(1)");
    }

    #[test]
    fn test_parenthesized_optional_chain_keeps_its_extent() {
        let chain = || {
            json!({
                "type": "ChainExpression",
                "expression": {
                    "type": "MemberExpression",
                    "object": id("a"),
                    "property": id("b"),
                    "computed": false,
                    "optional": true
                }
            })
        };

        let member = json!({
            "type": "MemberExpression",
            "object": chain(),
            "property": id("c"),
            "computed": false,
            "optional": false
        });
        assert_eq!(print(member), "(a?.b).c");

        let computed = json!({
            "type": "MemberExpression",
            "object": chain(),
            "property": id("c"),
            "computed": true,
            "optional": false
        });
        assert_eq!(print(computed), "(a?.b)[c]");

        let call = json!({ "type": "CallExpression", "callee": chain(), "arguments": [] });
        assert_eq!(print(call), "(a?.b)()");

        let new = json!({ "type": "NewExpression", "callee": chain(), "arguments": [] });
        assert_eq!(print(new), "new (a?.b)()");

        let inner_call = json!({
            "type": "ChainExpression",
            "expression": {
                "type": "CallExpression",
                "callee": {
                    "type": "MemberExpression",
                    "object": id("a"),
                    "property": id("b"),
                    "computed": false,
                    "optional": true
                },
                "arguments": []
            }
        });
        assert_eq!(print(inner_call), "a?.b()");
    }

    #[test]
    fn test_conditional_and_sequence_arguments() {
        let cond = json!({
            "type": "ConditionalExpression",
            "test": id("a"),
            "consequent": num("1"),
            "alternate": num("2")
        });
        let seq = json!({ "type": "SequenceExpression", "expressions": [id("a"), id("b")] });
        let call = json!({ "type": "CallExpression", "callee": id("f"), "arguments": [cond, seq] });
        assert_eq!(print(call), "f(a ? 1 : 2, (a, b))");
    }
}
