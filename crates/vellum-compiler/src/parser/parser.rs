//! The template parser: turns tokens into output code.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::expression::ExpressionParser;
use super::tags::TagRegistry;
use crate::ast::{Node, SourceLocation, make_escape_callable};
use crate::buffer::OutputBuffer;
use crate::config::{BufferOptions, ParserOptions};
use crate::error::{CompileError, Result};
use crate::lexer::{LexerLoc, MustacheToken, TagToken, Token, Tokenizer};
use crate::printer::{JsPrinter, Printer};
use crate::rewrite::{RewriteContext, ScopeStack, transform_ast};

/// The `(line:column)` marker acorn appends to its messages.
static POSITION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+:\d+\)").expect("position marker pattern is valid"));

/// Compiles the tokens of one unit into output code.
///
/// A parser holds the scope state of the unit it compiles, so every unit
/// gets its own parser; the tag registry and the collaborators are shared.
pub struct TemplateParser {
    tags: Arc<TagRegistry>,
    options: ParserOptions,
    stack: ScopeStack,
    expression_parser: Arc<dyn ExpressionParser>,
    printer: Arc<dyn Printer>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl TemplateParser {
    /// Creates a parser printing with [`JsPrinter`] and without a tokenizer.
    pub fn new(
        tags: Arc<TagRegistry>,
        expression_parser: Arc<dyn ExpressionParser>,
        options: ParserOptions,
    ) -> Self {
        Self {
            tags,
            stack: ScopeStack::new(options.local_variables.iter().cloned()),
            options,
            expression_parser,
            printer: Arc::new(JsPrinter::new()),
            tokenizer: None,
        }
    }

    /// Replaces the printer.
    pub fn with_printer(mut self, printer: Arc<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    /// Sets the tokenizer used by [`tokenize`](Self::tokenize) and
    /// [`compile`](Self::compile).
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Replaces the scope stack.
    pub fn with_stack(mut self, stack: ScopeStack) -> Self {
        self.stack = stack;
        self
    }

    /// The options of this unit.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Whether `await` is allowed in expressions.
    pub fn is_async(&self) -> bool {
        self.options.async_mode
    }

    /// The registered tag plugins.
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Names bound at the current point.
    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    /// Mutable access for tags that bind names for their children.
    pub fn stack_mut(&mut self) -> &mut ScopeStack {
        &mut self.stack
    }

    // ========================================================================
    // Expression utilities
    // ========================================================================

    /// Parses `js_arg` and moves every location in the tree into the template.
    ///
    /// `loc` is where the expression starts in the template. Parse errors are
    /// moved the same way: their line is offset by the expression's line, and
    /// their column by the expression's column when they sit on the first
    /// line of the fragment.
    pub fn generate_ast(&self, js_arg: &str, loc: &LexerLoc, filename: &str) -> Result<Node> {
        let line_offset = loc.start.line.saturating_sub(1);

        match self.expression_parser.parse(js_arg) {
            Ok(mut node) => {
                node.for_each_loc_mut(&mut |node_loc| {
                    if node_loc.start.line == 1 {
                        node_loc.start.column += loc.start.col;
                    }
                    node_loc.start.line += line_offset;
                    node_loc.end.line += line_offset;
                });
                Ok(node)
            }
            Err(failure) => {
                let column = if failure.line == 1 {
                    failure.column + loc.start.col
                } else {
                    failure.column
                };
                let message = POSITION_MARKER.replace(&failure.message, "");
                Err(CompileError::Syntax {
                    message: message.trim_end().to_string(),
                    location: SourceLocation::new(failure.line + line_offset, column, filename),
                })
            }
        }
    }

    /// Rewrites `node` against the scope state of this unit.
    pub fn transform_ast(&mut self, node: Node, filename: &str) -> Result<Node> {
        let mut ctx = RewriteContext::new(&mut self.stack, &self.options);
        transform_ast(node, filename, &mut ctx)
    }

    /// Prints `node` as source text.
    pub fn stringify(&self, node: &Node) -> String {
        self.printer.print(node)
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Tokenizes `template` with the configured tokenizer.
    pub fn tokenize(&self, template: &str, filename: &str) -> Result<Vec<Token>> {
        let tokenizer = self.tokenizer.as_ref().ok_or(CompileError::MissingTokenizer)?;
        tokenizer.tokenize(template, filename)
    }

    /// Writes the code for `token` into `buffer`.
    pub fn process_token(&mut self, token: &Token, buffer: &mut OutputBuffer) -> Result<()> {
        debug!(kind = token.type_name(), line = token.line(), filename = token.filename(), "processing token");

        match token {
            Token::Raw(raw) => {
                buffer.output_raw(&raw.value);
            }
            Token::Newline(_) => {
                buffer.output_raw("\n");
            }
            Token::Tag(tag) => self.process_tag(tag, buffer)?,
            Token::EscapedTag(tag) => self.process_escaped_tag(tag, buffer)?,
            Token::EscapedMustache(mustache) => {
                let text = format!("{{{{{}}}}}", mustache.properties.js_arg);
                output_raw_lines(buffer, &text);
            }
            Token::EscapedSafeMustache(mustache) => {
                let text = format!("{{{{{{{}}}}}}}", mustache.properties.js_arg);
                output_raw_lines(buffer, &text);
            }
            Token::Mustache(mustache) => self.process_mustache(mustache, true, buffer)?,
            Token::SafeMustache(mustache) => self.process_mustache(mustache, false, buffer)?,
        }
        Ok(())
    }

    fn process_tag(&mut self, tag: &TagToken, buffer: &mut OutputBuffer) -> Result<()> {
        if let Some(on_tag) = &self.options.on_tag {
            on_tag(tag);
        }

        let name = &tag.properties.name;
        let compiler = self.tags.get(name).cloned().ok_or_else(|| CompileError::UnknownTag {
            name: name.clone(),
            location: SourceLocation::new(tag.loc.start.line, tag.loc.start.col, &tag.filename),
        })?;
        compiler.compile(self, buffer, tag)
    }

    /// Escaped tags are written back as text; their children still compile.
    fn process_escaped_tag(&mut self, tag: &TagToken, buffer: &mut OutputBuffer) -> Result<()> {
        let name = &tag.properties.name;
        output_raw_lines(buffer, &format!("@{}({})", name, tag.properties.js_arg));
        for child in &tag.children {
            self.process_token(child, buffer)?;
        }
        buffer.output_raw(&format!("@end{name}"));
        Ok(())
    }

    fn process_mustache(
        &mut self,
        mustache: &MustacheToken,
        escape: bool,
        buffer: &mut OutputBuffer,
    ) -> Result<()> {
        if let Some(on_mustache) = &self.options.on_mustache {
            on_mustache(mustache);
        }

        let filename = &mustache.filename;
        let line = mustache.loc.start.line;
        let node = self.generate_ast(&mustache.properties.js_arg, &mustache.loc, filename)?;
        let node = self.transform_ast(node, filename)?;

        match node {
            // A template literal already produces a string
            Node::TemplateLiteral(_) => {
                let expression = self.escape(node, escape);
                buffer.output_expression(&self.stringify(&expression), filename, line, false);
            }
            Node::FunctionDeclaration(_) => {
                buffer.output_expression(&self.stringify(&node), filename, line, false);
            }
            _ => {
                let expression = self.escape(node, escape);
                buffer.output_expression(&self.stringify(&expression), filename, line, true);
            }
        }
        Ok(())
    }

    fn escape(&self, node: Node, escape: bool) -> Node {
        if escape {
            make_escape_callable(&self.options.escape_call_path, vec![node])
        } else {
            node
        }
    }

    // ========================================================================
    // Whole units
    // ========================================================================

    /// Compiles already tokenized template into output code.
    pub fn compile_tokens(
        &mut self,
        tokens: &[Token],
        filename: &str,
        buffer_options: BufferOptions,
    ) -> Result<String> {
        self.options.validate()?;
        buffer_options.validate()?;

        let mut buffer = OutputBuffer::new(filename, buffer_options);
        for token in tokens {
            self.process_token(token, &mut buffer)?;
        }
        debug!(filename, statements = buffer.size(), "compiled unit");
        Ok(buffer.flush().to_string())
    }

    /// Tokenizes and compiles `template`.
    pub fn compile(
        &mut self,
        template: &str,
        filename: &str,
        buffer_options: BufferOptions,
    ) -> Result<String> {
        let tokens = self.tokenize(template, filename)?;
        self.compile_tokens(&tokens, filename, buffer_options)
    }
}

impl std::fmt::Debug for TemplateParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateParser")
            .field("tags", &self.tags)
            .field("options", &self.options)
            .field("stack", &self.stack)
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}

fn output_raw_lines(buffer: &mut OutputBuffer, text: &str) {
    for line in text.split('\n') {
        buffer.output_raw(line);
    }
}
