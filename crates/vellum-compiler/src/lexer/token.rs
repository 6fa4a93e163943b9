//! Token definitions for tokenized templates.

use serde::{Deserialize, Serialize};

/// A position reported by the template tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexerPosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (0-based)
    pub col: u32,
}

impl LexerPosition {
    /// Creates a new position.
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// The span of a tag or interpolation inside the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexerLoc {
    /// Where the token's expression starts
    pub start: LexerPosition,
    /// Where the token ends
    pub end: LexerPosition,
}

impl LexerLoc {
    /// A location starting and ending at the given position.
    pub fn at(line: u32, col: u32) -> Self {
        let pos = LexerPosition::new(line, col);
        Self { start: pos, end: pos }
    }
}

/// Literal template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    /// The text
    pub value: String,
    /// Line the text sits on
    #[serde(default)]
    pub line: u32,
    /// Template file
    #[serde(default)]
    pub filename: String,
}

/// A line break in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewlineToken {
    /// Line the break ends
    #[serde(default)]
    pub line: u32,
    /// Template file
    #[serde(default)]
    pub filename: String,
}

/// Name and argument of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagProperties {
    /// Tag name (`if`, `each`, ...)
    pub name: String,
    /// Expression source between the parentheses
    #[serde(default)]
    pub js_arg: String,
    /// Whether the tag was written self-closing
    #[serde(default)]
    pub selfclosed: bool,
}

/// A block tag with its nested tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagToken {
    /// Name and argument
    pub properties: TagProperties,
    /// Where the tag sits in the template
    pub loc: LexerLoc,
    /// Template file
    #[serde(default)]
    pub filename: String,
    /// Tokens between the opening and the closing tag
    #[serde(default)]
    pub children: Vec<Token>,
}

/// Expression source of an interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustacheProperties {
    /// Expression source between the braces
    pub js_arg: String,
}

/// An interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustacheToken {
    /// Expression source
    pub properties: MustacheProperties,
    /// Where the expression starts in the template
    pub loc: LexerLoc,
    /// Template file
    #[serde(default)]
    pub filename: String,
}

/// A token produced by the template tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Token {
    /// Literal text
    #[serde(rename = "raw")]
    Raw(RawToken),
    /// Line break
    #[serde(rename = "newline")]
    Newline(NewlineToken),
    /// `@tag(...)`
    #[serde(rename = "tag")]
    Tag(TagToken),
    /// `@@tag(...)`, re-emitted verbatim
    #[serde(rename = "e__tag")]
    EscapedTag(TagToken),
    /// `{{ expr }}`, output escaped
    #[serde(rename = "mustache")]
    Mustache(MustacheToken),
    /// `{{{ expr }}}`, output as is
    #[serde(rename = "s__mustache")]
    SafeMustache(MustacheToken),
    /// `@{{ expr }}`, re-emitted verbatim
    #[serde(rename = "e__mustache")]
    EscapedMustache(MustacheToken),
    /// `@{{{ expr }}}`, re-emitted verbatim
    #[serde(rename = "es__mustache")]
    EscapedSafeMustache(MustacheToken),
}

impl Token {
    /// Template file the token came from.
    pub fn filename(&self) -> &str {
        match self {
            Token::Raw(raw) => &raw.filename,
            Token::Newline(newline) => &newline.filename,
            Token::Tag(tag) | Token::EscapedTag(tag) => &tag.filename,
            Token::Mustache(m)
            | Token::SafeMustache(m)
            | Token::EscapedMustache(m)
            | Token::EscapedSafeMustache(m) => &m.filename,
        }
    }

    /// Line the token starts on.
    pub fn line(&self) -> u32 {
        match self {
            Token::Raw(raw) => raw.line,
            Token::Newline(newline) => newline.line,
            Token::Tag(tag) | Token::EscapedTag(tag) => tag.loc.start.line,
            Token::Mustache(m)
            | Token::SafeMustache(m)
            | Token::EscapedMustache(m)
            | Token::EscapedSafeMustache(m) => m.loc.start.line,
        }
    }

    /// The tokenizer's name for this token type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::Raw(_) => "raw",
            Token::Newline(_) => "newline",
            Token::Tag(_) => "tag",
            Token::EscapedTag(_) => "e__tag",
            Token::Mustache(_) => "mustache",
            Token::SafeMustache(_) => "s__mustache",
            Token::EscapedMustache(_) => "e__mustache",
            Token::EscapedSafeMustache(_) => "es__mustache",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_token_stream() {
        let json = r#"[
            { "type": "raw", "value": "Hello ", "line": 1, "filename": "index.edge" },
            { "type": "mustache", "filename": "index.edge",
              "properties": { "jsArg": " username " },
              "loc": { "start": { "line": 1, "col": 8 }, "end": { "line": 1, "col": 20 } } },
            { "type": "newline", "line": 1, "filename": "index.edge" },
            { "type": "tag", "filename": "index.edge",
              "properties": { "name": "if", "jsArg": "admin", "selfclosed": false },
              "loc": { "start": { "line": 2, "col": 4 }, "end": { "line": 2, "col": 10 } },
              "children": [{ "type": "raw", "value": "hi", "line": 3, "filename": "index.edge" }] }
        ]"#;
        let tokens: Vec<Token> = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(matches!(&tokens[0], Token::Raw(raw) if raw.value == "Hello "));
        assert!(matches!(&tokens[1], Token::Mustache(m) if m.properties.js_arg == " username "));
        assert_eq!(tokens[1].line(), 1);
        assert_eq!(tokens[3].type_name(), "tag");
        let Token::Tag(tag) = &tokens[3] else {
            panic!("expected tag token");
        };
        assert_eq!(tag.properties.name, "if");
        assert_eq!(tag.children.len(), 1);
    }

    #[test]
    fn test_escaped_variants() {
        let token: Token = serde_json::from_str(
            r#"{ "type": "es__mustache", "properties": { "jsArg": "x" }, "loc": { "start": { "line": 4, "col": 1 }, "end": { "line": 4, "col": 2 } } }"#,
        )
        .unwrap();
        assert!(matches!(token, Token::EscapedSafeMustache(_)));
        assert_eq!(token.filename(), "");
        assert_eq!(token.line(), 4);
    }
}
