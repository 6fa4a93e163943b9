//! Abstract Syntax Tree (AST) definitions for template expressions.
//!
//! These structures follow ESTree, the tree format produced by the external
//! expression parser. A [`Node`] deserializes straight from ESTree JSON; kinds
//! this crate does not model become [`Node::Other`] so that the rewrite pass
//! can reject them with their source location instead of failing to load.

mod builder;
mod operators;
mod visit;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub use builder::{
    identifier, make_callable, make_escape_callable, make_member_accessor,
    make_state_property_accessor, string_literal,
};
pub use operators::{AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator};

/// A line/column position. Lines are one-based, columns zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (0-based)
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The ESTree `loc` of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loc {
    /// Where the node starts
    pub start: Position,
    /// Where the node ends
    pub end: Position,
}

impl Loc {
    /// Creates a location spanning `start..end`.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width location at the given line and column.
    pub fn at(line: u32, column: u32) -> Self {
        let pos = Position::new(line, column);
        Self { start: pos, end: pos }
    }
}

/// A location inside a template file, attached to every compile error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    /// Line number (1-based, 0 when unknown)
    pub line: u32,
    /// Column number (0-based)
    pub column: u32,
    /// Template file the location points into
    pub filename: String,
}

impl SourceLocation {
    /// Creates a new source location.
    pub fn new(line: u32, column: u32, filename: impl Into<String>) -> Self {
        Self {
            line,
            column,
            filename: filename.into(),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

macro_rules! node_kinds {
    ($($(#[$doc:meta])* $kind:ident,)*) => {
        /// A node of an expression tree, tagged by its ESTree kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Node {
            $($(#[$doc])* $kind($kind),)*
            /// Any ESTree kind not modelled above
            Other(OtherNode),
        }

        #[derive(Deserialize)]
        #[serde(tag = "type")]
        enum ModelledNode {
            $($kind($kind),)*
        }

        impl From<ModelledNode> for Node {
            fn from(node: ModelledNode) -> Self {
                match node {
                    $(ModelledNode::$kind(inner) => Node::$kind(inner),)*
                }
            }
        }

        const MODELLED_KINDS: &[&str] = &[$(stringify!($kind)),*];

        impl Node {
            /// The ESTree `type` of this node.
            pub fn kind(&self) -> &str {
                match self {
                    $(Node::$kind(_) => stringify!($kind),)*
                    Node::Other(other) => &other.kind,
                }
            }

            /// The node's location, when the parser recorded one.
            pub fn loc(&self) -> Option<&Loc> {
                match self {
                    $(Node::$kind(inner) => inner.loc.as_ref(),)*
                    Node::Other(other) => other.loc.as_ref(),
                }
            }

            pub(crate) fn loc_slot(&mut self) -> &mut Option<Loc> {
                match self {
                    $(Node::$kind(inner) => &mut inner.loc,)*
                    Node::Other(other) => &mut other.loc,
                }
            }
        }
    };
}

node_kinds! {
    /// Identifier reference
    Identifier,
    /// Literal value
    Literal,
    /// `this` keyword
    ThisExpression,
    /// Array literal
    ArrayExpression,
    /// Object literal
    ObjectExpression,
    /// Object literal or object pattern member
    Property,
    /// Function declaration
    FunctionDeclaration,
    /// Arrow function expression
    ArrowFunctionExpression,
    /// Unary expression
    UnaryExpression,
    /// Binary expression
    BinaryExpression,
    /// `&&`, `||` and `??`
    LogicalExpression,
    /// Assignment expression
    AssignmentExpression,
    /// Conditional (ternary) expression
    ConditionalExpression,
    /// Call expression
    CallExpression,
    /// `new` expression
    NewExpression,
    /// Member access expression
    MemberExpression,
    /// Optional chain wrapper
    ChainExpression,
    /// Sequence expression (comma operator)
    SequenceExpression,
    /// Template literal
    TemplateLiteral,
    /// Spread element `...x`
    SpreadElement,
    /// `await` expression
    AwaitExpression,
    /// Block statement `{ ... }`
    BlockStatement,
    /// Expression statement
    ExpressionStatement,
    /// Return statement
    ReturnStatement,
    /// Object destructuring pattern
    ObjectPattern,
    /// Array destructuring pattern
    ArrayPattern,
    /// Parameter default `a = 1`
    AssignmentPattern,
    /// Rest parameter or element `...rest`
    RestElement,
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| de::Error::missing_field("type"))?;

        if MODELLED_KINDS.contains(&kind) {
            return ModelledNode::deserialize(value)
                .map(Node::from)
                .map_err(de::Error::custom);
        }

        let kind = kind.to_owned();
        let loc = match value.get("loc") {
            Some(loc) if !loc.is_null() => Some(Loc::deserialize(loc).map_err(de::Error::custom)?),
            _ => None,
        };
        Ok(Node::Other(OtherNode { kind, loc }))
    }
}

impl Node {
    /// Returns the identifier name when this node is a plain identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Node::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

/// An ESTree node of a kind this crate does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherNode {
    /// The ESTree `type` tag
    pub kind: String,
    /// Location of the node
    pub loc: Option<Loc>,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// The value carried by a literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// null literal
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// Values JSON cannot carry (regular expressions, bigints)
    Opaque(serde_json::Value),
}

/// The pattern and flags of a regular expression literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegexLiteral {
    /// The pattern source
    pub pattern: String,
    /// The flags
    pub flags: String,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Literal {
    /// The literal value
    pub value: LiteralValue,
    /// Source text of the literal, when known
    #[serde(default)]
    pub raw: Option<String>,
    /// Regular expression details
    #[serde(default)]
    pub regex: Option<RegexLiteral>,
    /// BigInt digits
    #[serde(default)]
    pub bigint: Option<String>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// The `this` keyword.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThisExpression {
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An array expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrayExpression {
    /// The elements (None represents a hole)
    pub elements: Vec<Option<Node>>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An object expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectExpression {
    /// `Property` and `SpreadElement` members
    pub properties: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Plain `key: value`
    #[default]
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// An object property.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Property {
    /// The property key
    pub key: Box<Node>,
    /// The property value
    pub value: Box<Node>,
    /// Init, getter or setter
    #[serde(default)]
    pub kind: PropertyKind,
    /// Whether the key is computed (`[key]: value`)
    #[serde(default)]
    pub computed: bool,
    /// Whether this is shorthand syntax
    #[serde(default)]
    pub shorthand: bool,
    /// Whether this is method syntax
    #[serde(default)]
    pub method: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionDeclaration {
    /// The function name
    #[serde(default)]
    pub id: Option<Identifier>,
    /// The parameters
    pub params: Vec<Node>,
    /// The function body
    pub body: Box<Node>,
    /// Whether this is a generator function
    #[serde(default)]
    pub generator: bool,
    /// Whether this is an async function
    #[serde(default, rename = "async")]
    pub is_async: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An arrow function expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrowFunctionExpression {
    /// Parameters
    pub params: Vec<Node>,
    /// Body (expression or block)
    pub body: Box<Node>,
    /// Whether the body is an expression
    #[serde(default)]
    pub expression: bool,
    /// Whether async
    #[serde(default, rename = "async")]
    pub is_async: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnaryExpression {
    /// The operator
    pub operator: UnaryOperator,
    /// Always true for ESTree unary expressions
    #[serde(default = "default_true")]
    pub prefix: bool,
    /// The operand
    pub argument: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinaryExpression {
    /// The operator
    pub operator: BinaryOperator,
    /// The left operand
    pub left: Box<Node>,
    /// The right operand
    pub right: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A logical expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogicalExpression {
    /// The operator
    pub operator: LogicalOperator,
    /// The left operand
    pub left: Box<Node>,
    /// The right operand
    pub right: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssignmentExpression {
    /// The operator
    pub operator: AssignmentOperator,
    /// The left-hand side
    pub left: Box<Node>,
    /// The right-hand side
    pub right: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A conditional (ternary) expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionalExpression {
    /// The condition
    pub test: Box<Node>,
    /// The consequent (if true)
    pub consequent: Box<Node>,
    /// The alternate (if false)
    pub alternate: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallExpression {
    /// The function being called
    pub callee: Box<Node>,
    /// The arguments
    pub arguments: Vec<Node>,
    /// Whether this is an optional call `f?.()`
    #[serde(default)]
    pub optional: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A new expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewExpression {
    /// The constructor
    pub callee: Box<Node>,
    /// The arguments
    pub arguments: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A member access expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberExpression {
    /// The object
    pub object: Box<Node>,
    /// The property
    pub property: Box<Node>,
    /// Whether this is computed (bracket notation)
    #[serde(default)]
    pub computed: bool,
    /// Whether this is an optional access `a?.b`
    #[serde(default)]
    pub optional: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Wrapper around an expression containing optional accesses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainExpression {
    /// The chained expression
    pub expression: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A sequence expression (comma operator).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SequenceExpression {
    /// The expressions
    pub expressions: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Cooked and raw text of a template quasi.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateElementValue {
    /// Source text as written
    pub raw: String,
    /// Text with escapes processed
    #[serde(default)]
    pub cooked: Option<String>,
}

/// A static chunk of a template literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateElement {
    /// The text
    pub value: TemplateElementValue,
    /// Whether this is the final chunk
    #[serde(default)]
    pub tail: bool,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A template literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateLiteral {
    /// Static chunks, one more than `expressions`
    pub quasis: Vec<TemplateElement>,
    /// Interpolated expressions
    pub expressions: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A spread element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpreadElement {
    /// The spread operand
    pub argument: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An await expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AwaitExpression {
    /// The awaited expression
    pub argument: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A block statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockStatement {
    /// The statements in the block
    pub body: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpressionStatement {
    /// The expression
    pub expression: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReturnStatement {
    /// The return value
    #[serde(default)]
    pub argument: Option<Box<Node>>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An object destructuring pattern.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectPattern {
    /// `Property` and `RestElement` members
    pub properties: Vec<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An array destructuring pattern.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrayPattern {
    /// The elements (None represents a hole)
    pub elements: Vec<Option<Node>>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A pattern with a default value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssignmentPattern {
    /// The bound pattern
    pub left: Box<Node>,
    /// The default value
    pub right: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A rest element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestElement {
    /// The bound pattern
    pub argument: Box<Node>,
    /// Location of the node
    #[serde(default)]
    pub loc: Option<Loc>,
}

fn default_true() -> bool {
    true
}
