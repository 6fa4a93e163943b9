//! End-to-end compilation: template text through a tokenizer, tag plugins,
//! the rewriter and the output buffer.

use std::sync::Arc;

use serde_json::json;
use vellum_compiler::ast::{Node, SourceLocation};
use vellum_compiler::buffer::OutputBuffer;
use vellum_compiler::lexer::{
    LexerLoc, LexerPosition, MustacheProperties, MustacheToken, NewlineToken, RawToken,
    TagProperties, TagToken,
};
use vellum_compiler::{
    BufferOptions, CompileError, ParserOptions, PreparsedExpressions, Result, TagRegistry,
    TemplateParser, Token, Tokenizer,
};

/// Tokenizes one tag per line (`@name(arg)` ... `@end`) and `{{ }}` / `{{{ }}}`
/// interpolations inside text lines.
struct LineTokenizer;

impl Tokenizer for LineTokenizer {
    fn tokenize(&self, template: &str, filename: &str) -> Result<Vec<Token>> {
        let mut root = Vec::new();
        let mut open: Vec<TagToken> = Vec::new();
        let lines: Vec<&str> = template.split('\n').collect();

        for (index, text) in lines.iter().enumerate() {
            let line = index as u32 + 1;
            let trimmed = text.trim();

            if trimmed == "@end" {
                let tag = open.pop().ok_or_else(|| CompileError::Tokenize {
                    message: "Unexpected @end".into(),
                    location: SourceLocation::new(line, 0, filename),
                })?;
                current(&mut open, &mut root).push(Token::Tag(tag));
                continue;
            }

            if let Some(tag) = parse_tag(text, line, filename) {
                open.push(tag);
                continue;
            }

            let target = current(&mut open, &mut root);
            scan_line(text, line, filename, target)?;
            if index + 1 < lines.len() {
                target.push(Token::Newline(NewlineToken {
                    line,
                    filename: filename.to_string(),
                }));
            }
        }

        match open.pop() {
            Some(tag) => Err(CompileError::Tokenize {
                message: format!("Unclosed tag {}", tag.properties.name),
                location: SourceLocation::new(tag.loc.start.line, tag.loc.start.col, filename),
            }),
            None => Ok(root),
        }
    }
}

fn current<'a>(open: &'a mut [TagToken], root: &'a mut Vec<Token>) -> &'a mut Vec<Token> {
    match open.last_mut() {
        Some(tag) => &mut tag.children,
        None => root,
    }
}

fn parse_tag(text: &str, line: u32, filename: &str) -> Option<TagToken> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('@')?.strip_suffix(')')?;
    let (name, js_arg) = rest.split_once('(')?;
    let col = text.find('(')? as u32 + 1;
    Some(TagToken {
        properties: TagProperties {
            name: name.to_string(),
            js_arg: js_arg.to_string(),
            selfclosed: false,
        },
        loc: LexerLoc {
            start: LexerPosition::new(line, col),
            end: LexerPosition::new(line, text.len() as u32),
        },
        filename: filename.to_string(),
        children: Vec::new(),
    })
}

fn scan_line(text: &str, line: u32, filename: &str, out: &mut Vec<Token>) -> Result<()> {
    let raw = |value: &str| {
        Token::Raw(RawToken {
            value: value.to_string(),
            line,
            filename: filename.to_string(),
        })
    };

    let mut cursor = 0;
    while let Some(found) = text[cursor..].find("{{") {
        let start = cursor + found;
        let safe = text[start..].starts_with("{{{");
        let (open, close) = if safe { ("{{{", "}}}") } else { ("{{", "}}") };
        let expr_start = start + open.len();
        let expr_end = text[expr_start..]
            .find(close)
            .map(|offset| expr_start + offset)
            .ok_or_else(|| CompileError::Tokenize {
                message: format!("Missing token \"{close}\""),
                location: SourceLocation::new(line, start as u32, filename),
            })?;

        if start > cursor {
            out.push(raw(&text[cursor..start]));
        }
        let token = MustacheToken {
            properties: MustacheProperties {
                js_arg: text[expr_start..expr_end].to_string(),
            },
            loc: LexerLoc {
                start: LexerPosition::new(line, expr_start as u32),
                end: LexerPosition::new(line, (expr_end + close.len()) as u32),
            },
            filename: filename.to_string(),
        };
        out.push(if safe {
            Token::SafeMustache(token)
        } else {
            Token::Mustache(token)
        });
        cursor = expr_end + close.len();
    }

    if cursor < text.len() {
        out.push(raw(&text[cursor..]));
    }
    Ok(())
}

/// `@each(item in list)`: loops over `list` with `item` bound for the children.
fn each_tag(parser: &mut TemplateParser, buffer: &mut OutputBuffer, token: &TagToken) -> Result<()> {
    let filename = &token.filename;
    let line = token.loc.start.line;
    let (item, list) = token.properties.js_arg.split_once(" in ").ok_or_else(|| CompileError::Tag {
        message: "@each expects \"item in list\"".into(),
        location: SourceLocation::new(line, token.loc.start.col, filename),
    })?;

    let list_loc = LexerLoc {
        start: LexerPosition::new(line, token.loc.start.col + (item.len() + 4) as u32),
        end: token.loc.end,
    };
    let node = parser.generate_ast(list, &list_loc, filename)?;
    let node = parser.transform_ast(node, filename)?;
    let list = parser.stringify(&node);
    buffer.write_statement(&format!("for (const {item} of {list}) {{"), filename, line);

    parser.stack_mut().push_scope();
    parser.stack_mut().declare(item);
    let children = token
        .children
        .iter()
        .try_for_each(|child| parser.process_token(child, buffer));
    parser.stack_mut().pop_scope();
    children?;

    buffer.write_statement("}", filename, line);
    Ok(())
}

fn statement(expression: serde_json::Value) -> Node {
    serde_json::from_value(json!({ "type": "ExpressionStatement", "expression": expression })).unwrap()
}

fn id(name: &str) -> serde_json::Value {
    json!({ "type": "Identifier", "name": name })
}

fn expressions() -> PreparsedExpressions {
    let mut table = PreparsedExpressions::new();
    table
        .insert("username", statement(id("username")))
        .insert("users", statement(id("users")))
        .insert("bio", statement(id("bio")))
        .insert(
            "user.name",
            statement(json!({
                "type": "MemberExpression",
                "object": id("user"),
                "property": id("name"),
                "computed": false,
                "optional": false
            })),
        )
        .insert(
            "Math.max(score, 10)",
            statement(json!({
                "type": "CallExpression",
                "callee": {
                    "type": "MemberExpression",
                    "object": id("Math"),
                    "property": id("max"),
                    "computed": false,
                    "optional": false
                },
                "arguments": [id("score"), { "type": "Literal", "value": 10, "raw": "10" }],
                "optional": false
            })),
        );
    table
}

fn parser(options: ParserOptions) -> TemplateParser {
    let tags = TagRegistry::new().with("each", each_tag);
    TemplateParser::new(Arc::new(tags), Arc::new(expressions()), options)
        .with_tokenizer(Arc::new(LineTokenizer))
}

fn scaffold(filename: &str, body: &[&str]) -> String {
    let header = format!("let $filename = \"{filename}\";");
    let mut lines = vec!["let out = \"\";", "let $lineNumber = 1;", header.as_str(), "try {"];
    lines.extend_from_slice(body);
    lines.extend_from_slice(&[
        "} catch (error) {",
        "ctx.reThrow(error, $filename, $lineNumber);",
        "}",
        "return out;",
    ]);
    lines.join("\n")
}

#[test]
fn test_compile_template() {
    let template = "Hello {{ username }}\n@each(user in users)\n- {{ user.name }} {{{ bio }}}\n@end";
    let code = parser(ParserOptions::default())
        .compile(template, "users.edge", BufferOptions::default())
        .unwrap();

    assert_eq!(
        code,
        scaffold(
            "users.edge",
            &[
                "out += \"Hello \";",
                "out += `${ctx.escape(state.username)}`;",
                "out += \"\\n\";",
                "$lineNumber = 2;",
                "for (const user of state.users) {",
                "out += \"- \";",
                "$lineNumber = 3;",
                "out += `${ctx.escape(user.name)}`;",
                "out += \" \";",
                "out += `${state.bio}`;",
                "out += \"\\n\";",
                "$lineNumber = 2;",
                "}",
            ]
        )
    );
}

#[test]
fn test_loop_binding_does_not_leak() {
    let template = "@each(user in users)\n{{ user.name }}\n@end\n{{ user.name }}";
    let mut parser = parser(ParserOptions::default());
    let code = parser
        .compile(template, "users.edge", BufferOptions::default())
        .unwrap();

    assert!(code.contains("out += `${ctx.escape(user.name)}`;"));
    assert!(code.contains("out += `${ctx.escape(state.user.name)}`;"));
    assert_eq!(parser.stack().depth(), 0);
}

#[test]
fn test_globals_and_locals_are_not_rewritten() {
    let options = ParserOptions {
        local_variables: vec!["score".into()],
        ..ParserOptions::default()
    }
    .with_ecmascript_globals();
    let code = parser(options)
        .compile("{{{ Math.max(score, 10) }}}", "score.edge", BufferOptions::default())
        .unwrap();

    assert!(code.contains("out += `${Math.max(score, 10)}`;"));
}

#[test]
fn test_custom_buffer_options() {
    let options = BufferOptions::new("html", vellum_compiler::CallPath::Function("rethrow".into()));
    let code = parser(ParserOptions::default())
        .compile("{{ username }}", "a.edge", options)
        .unwrap();

    assert!(code.starts_with("let html = \"\";"));
    assert!(code.contains("html += `${ctx.escape(state.username)}`;"));
    assert!(code.contains("rethrow(error, $filename, $lineNumber);"));
    assert!(code.ends_with("return html;"));
}

#[test]
fn test_tag_error_points_at_tag() {
    let err = parser(ParserOptions::default())
        .compile("first line\n  @each(users)\n@end", "bad.edge", BufferOptions::default())
        .unwrap_err();

    assert_eq!(err.code(), "E_TAG_ERROR");
    let location = err.location().unwrap();
    assert_eq!((location.line, location.column, location.filename.as_str()), (2, 8, "bad.edge"));
}

#[test]
fn test_unknown_expression_is_a_syntax_error() {
    let err = parser(ParserOptions::default())
        .compile("Hi\n{{ missing }}", "a.edge", BufferOptions::default())
        .unwrap_err();

    assert_eq!(err.code(), "E_ACORN_ERROR");
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((2, 2)));
}

#[test]
fn test_tokenizer_errors_surface() {
    let err = parser(ParserOptions::default())
        .compile("{{ username", "a.edge", BufferOptions::default())
        .unwrap_err();
    assert_eq!(err.code(), "E_LEXER_ERROR");

    let err = parser(ParserOptions::default())
        .compile("@each(user in users)", "a.edge", BufferOptions::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "Unclosed tag each");
}
