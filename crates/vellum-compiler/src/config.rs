//! Per-unit configuration for the template parser and the output buffer.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use unicode_xid::UnicodeXID;

use crate::error::{CompileError, Result};
use crate::lexer::{MustacheToken, TagToken};

/// A callable referenced by generated code: `name` or `object.method`.
///
/// Deserializes from either `"name"` or `["object", "method"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallPath {
    /// A free function
    Function(String),
    /// A method on an object
    Method(String, String),
}

impl CallPath {
    /// Creates a method path.
    pub fn method(object: impl Into<String>, method: impl Into<String>) -> Self {
        CallPath::Method(object.into(), method.into())
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            CallPath::Function(name) => vec![name.as_str()],
            CallPath::Method(object, method) => vec![object.as_str(), method.as_str()],
        }
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPath::Function(name) => f.write_str(name),
            CallPath::Method(object, method) => write!(f, "{object}.{method}"),
        }
    }
}

/// Observer invoked for every processed tag token.
pub type TagHook = Arc<dyn Fn(&TagToken) + Send + Sync>;

/// Observer invoked for every processed interpolation token.
pub type MustacheHook = Arc<dyn Fn(&MustacheToken) + Send + Sync>;

/// Options controlling how expressions are resolved inside one compiled unit.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Object free identifiers are looked up on (`name` becomes `state.name`)
    pub state_property_name: String,

    /// Function wrapping `{{ }}` output
    pub escape_call_path: CallPath,

    /// Names bound for the whole unit
    pub local_variables: Vec<String>,

    /// Names that exist at runtime and are never rewritten
    pub globals: FxHashSet<String>,

    /// Whether `await` is allowed in expressions
    #[serde(rename = "async")]
    pub async_mode: bool,

    /// Called for every tag token before its plugin runs
    #[serde(skip)]
    pub on_tag: Option<TagHook>,

    /// Called for every interpolation token before it is compiled
    #[serde(skip)]
    pub on_mustache: Option<MustacheHook>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            state_property_name: "state".to_string(),
            escape_call_path: CallPath::method("ctx", "escape"),
            local_variables: Vec::new(),
            globals: FxHashSet::default(),
            async_mode: false,
            on_tag: None,
            on_mustache: None,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("state_property_name", &self.state_property_name)
            .field("escape_call_path", &self.escape_call_path)
            .field("local_variables", &self.local_variables)
            .field("globals", &self.globals.len())
            .field("async_mode", &self.async_mode)
            .field("on_tag", &self.on_tag.is_some())
            .field("on_mustache", &self.on_mustache.is_some())
            .finish()
    }
}

impl ParserOptions {
    /// Adds the ECMAScript standard built-ins to the known globals.
    pub fn with_ecmascript_globals(mut self) -> Self {
        self.globals
            .extend(ECMASCRIPT_GLOBALS.iter().map(|name| name.to_string()));
        self
    }

    /// Adds names to the known globals.
    pub fn with_globals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Checks that every configured name can be emitted as an identifier.
    pub fn validate(&self) -> Result<()> {
        ensure_identifier("statePropertyName", &self.state_property_name)?;
        for segment in self.escape_call_path.segments() {
            ensure_identifier("escapeCallPath", segment)?;
        }
        for name in &self.local_variables {
            ensure_identifier("localVariables", name)?;
        }
        Ok(())
    }
}

/// Names of the generated variables and the rethrow target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BufferOptions {
    /// Variable the rendered output is accumulated in
    pub output_var: String,
    /// Function receiving runtime errors with file and line
    pub rethrow_call_path: CallPath,
    /// Variable tracking the current template file
    pub file_name_var: String,
    /// Variable tracking the current template line
    pub line_var: String,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            output_var: "out".to_string(),
            rethrow_call_path: CallPath::method("ctx", "reThrow"),
            file_name_var: "$filename".to_string(),
            line_var: "$lineNumber".to_string(),
        }
    }
}

impl BufferOptions {
    /// Options with the given output variable and rethrow target.
    pub fn new(output_var: impl Into<String>, rethrow_call_path: CallPath) -> Self {
        Self {
            output_var: output_var.into(),
            rethrow_call_path,
            ..Self::default()
        }
    }

    /// Checks that every configured name can be emitted as an identifier.
    pub fn validate(&self) -> Result<()> {
        ensure_identifier("outputVar", &self.output_var)?;
        ensure_identifier("fileNameVar", &self.file_name_var)?;
        ensure_identifier("lineVar", &self.line_var)?;
        for segment in self.rethrow_call_path.segments() {
            ensure_identifier("rethrowCallPath", segment)?;
        }
        Ok(())
    }
}

/// Overrides applied by [`crate::OutputBuffer::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BufferOverrides {
    /// Replacement output variable
    pub output_var: Option<String>,
    /// Replacement rethrow target
    pub rethrow_call_path: Option<CallPath>,
}

/// Returns true when `name` is a valid JavaScript identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '$' || first == '_' || first.is_xid_start() => chars
            .all(|c| c == '$' || c == '\u{200c}' || c == '\u{200d}' || c.is_xid_continue()),
        _ => false,
    }
}

fn ensure_identifier(option: &str, name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(CompileError::Config(format!(
            "option `{option}` must be a valid identifier, got {name:?}"
        )))
    }
}

/// Standard ECMAScript global bindings.
pub const ECMASCRIPT_GLOBALS: &[&str] = &[
    "globalThis",
    "Infinity",
    "NaN",
    "undefined",
    "eval",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "unescape",
    "Array",
    "ArrayBuffer",
    "BigInt",
    "Boolean",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "Function",
    "Intl",
    "JSON",
    "Map",
    "Math",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "URIError",
    "WeakMap",
    "WeakSet",
    "console",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_path_deserialize() {
        let single: CallPath = serde_json::from_str(r#""escape""#).unwrap();
        let pair: CallPath = serde_json::from_str(r#"["ctx", "reThrow"]"#).unwrap();
        assert_eq!(single, CallPath::Function("escape".into()));
        assert_eq!(pair, CallPath::method("ctx", "reThrow"));
        assert_eq!(pair.to_string(), "ctx.reThrow");
    }

    #[test]
    fn test_parser_options_from_json() {
        let options: ParserOptions = serde_json::from_str(
            r#"{ "statePropertyName": "data", "localVariables": ["item"], "async": true }"#,
        )
        .unwrap();
        assert_eq!(options.state_property_name, "data");
        assert_eq!(options.local_variables, vec!["item".to_string()]);
        assert!(options.async_mode);
        assert_eq!(options.escape_call_path, CallPath::method("ctx", "escape"));
    }

    #[test]
    fn test_buffer_options_defaults() {
        let options: BufferOptions = serde_json::from_str(r#"{ "outputVar": "html" }"#).unwrap();
        assert_eq!(options.output_var, "html");
        assert_eq!(options.file_name_var, "$filename");
        assert_eq!(options.line_var, "$lineNumber");
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_identifier("state"));
        assert!(is_identifier("$lineNumber"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("état"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let options = ParserOptions {
            state_property_name: "my state".into(),
            ..ParserOptions::default()
        };
        assert!(matches!(options.validate(), Err(CompileError::Config(_))));

        let buffer = BufferOptions::new("out", CallPath::method("ctx", "re-throw"));
        assert!(buffer.validate().is_err());
        assert!(BufferOptions::default().validate().is_ok());
    }

    #[test]
    fn test_ecmascript_globals() {
        let options = ParserOptions::default().with_ecmascript_globals();
        assert!(options.globals.contains("Math"));
        assert!(options.globals.contains("JSON"));
        assert!(!options.globals.contains("user"));
    }
}
