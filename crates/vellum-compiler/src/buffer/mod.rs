//! The output buffer generated code is collected in.
//!
//! Every compiled unit writes into an [`OutputBuffer`]: raw template text,
//! interpolated expressions and the statements tag plugins emit. On
//! [`flush`](OutputBuffer::flush) the statements are wrapped into a function
//! body that accumulates the rendered output in one variable and forwards
//! runtime errors, together with the template file and line they happened
//! at, to a rethrow function.
//!
//! ```text
//! let out = "";
//! let $lineNumber = 1;
//! let $filename = "index.edge";
//! try {
//! out += "Hello ";
//! out += `${ctx.escape(state.username)}`;
//! } catch (error) {
//! ctx.reThrow(error, $filename, $lineNumber);
//! }
//! return out;
//! ```
//!
//! File and line updates are only written when they change, so a template
//! without tags or interpolations on later lines gets no instrumentation.

mod stringify;

pub use stringify::js_stringify;

use std::cell::OnceCell;

use tracing::warn;

use crate::config::{BufferOptions, BufferOverrides};

/// Accumulates generated statements for one compiled unit.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    options: BufferOptions,
    rethrow_call: String,
    filename: String,

    prefix: Vec<String>,
    suffix: Vec<String>,
    lines: Vec<String>,

    current_filename: String,
    current_line: u32,

    output_out_variable: bool,
    output_file_and_line: bool,
    output_return_statement: bool,
    wrap_inside_try_catch: bool,

    compiled: OnceCell<String>,
}

impl OutputBuffer {
    /// Creates an empty buffer for `filename`.
    pub fn new(filename: impl Into<String>, options: BufferOptions) -> Self {
        let filename = filename.into();
        Self {
            rethrow_call: options.rethrow_call_path.to_string(),
            options,
            current_filename: filename.clone(),
            filename,
            prefix: Vec::new(),
            suffix: Vec::new(),
            lines: Vec::new(),
            current_line: 1,
            output_out_variable: true,
            output_file_and_line: true,
            output_return_statement: true,
            wrap_inside_try_catch: true,
            compiled: OnceCell::new(),
        }
    }

    /// Creates an empty buffer for `filename` with this buffer's options,
    /// replacing the ones given in `overrides`.
    pub fn create(&self, filename: impl Into<String>, overrides: BufferOverrides) -> Self {
        let mut options = self.options.clone();
        if let Some(output_var) = overrides.output_var {
            options.output_var = output_var;
        }
        if let Some(rethrow_call_path) = overrides.rethrow_call_path {
            options.rethrow_call_path = rethrow_call_path;
        }
        Self::new(filename, options)
    }

    /// Number of statements written so far.
    pub fn size(&self) -> usize {
        self.lines.len()
    }

    /// Name of the variable the output is accumulated in.
    pub fn output_variable_name(&self) -> &str {
        &self.options.output_var
    }

    /// The file this buffer was created for.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The options this buffer was created with.
    pub fn options(&self) -> &BufferOptions {
        &self.options
    }

    /// Returns true once [`flush`](Self::flush) has produced the final code.
    pub fn is_flushed(&self) -> bool {
        self.compiled.get().is_some()
    }

    fn push(&mut self, line: String) {
        if self.is_flushed() {
            warn!(
                filename = %self.filename,
                statement = %line,
                "write after flush is not reflected in the compiled output"
            );
        }
        self.lines.push(line);
    }

    fn update_filename(&mut self, filename: &str) {
        if self.current_filename != filename {
            self.current_filename = filename.to_string();
            let line = format!("{} = {};", self.options.file_name_var, js_stringify(filename));
            self.push(line);
        }
    }

    fn update_line_number(&mut self, line_number: u32) {
        if line_number > 0 && self.current_line != line_number {
            self.current_line = line_number;
            let line = format!("{} = {};", self.options.line_var, line_number);
            self.push(line);
        }
    }

    /// Appends literal template text to the output.
    pub fn output_raw(&mut self, text: &str) -> &mut Self {
        let line = format!("{} += {};", self.options.output_var, js_stringify(text));
        self.push(line);
        self
    }

    /// Appends the value of a JavaScript expression to the output.
    ///
    /// With `template_literal` set the value is converted through a template
    /// literal (`` `${text}` ``), which turns `undefined` and `null` into text
    /// the same way string concatenation would.
    pub fn output_expression(
        &mut self,
        text: &str,
        filename: &str,
        line_number: u32,
        template_literal: bool,
    ) -> &mut Self {
        self.update_filename(filename);
        self.update_line_number(line_number);
        let line = if template_literal {
            format!("{} += `${{{}}}`;", self.options.output_var, text)
        } else {
            format!("{} += {};", self.options.output_var, text)
        };
        self.push(line);
        self
    }

    /// Writes a JavaScript expression as its own statement.
    pub fn write_expression(&mut self, text: &str, filename: &str, line_number: u32) -> &mut Self {
        self.update_filename(filename);
        self.update_line_number(line_number);
        self.push(format!("{text};"));
        self
    }

    /// Writes JavaScript code as is. No semicolon is added, so this is the way
    /// to open and close blocks like `if (cond) {`.
    pub fn write_statement(&mut self, text: &str, filename: &str, line_number: u32) -> &mut Self {
        self.update_filename(filename);
        self.update_line_number(line_number);
        self.push(text.to_string());
        self
    }

    /// Surrounds the generated code with `prefix` and `suffix`.
    ///
    /// Prefixes and suffixes are both emitted in call order.
    pub fn wrap(&mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> &mut Self {
        self.prefix.push(prefix.into());
        self.suffix.push(suffix.into());
        self
    }

    /// Leaves out the file and line variable declarations.
    pub fn disable_file_and_line_variables(&mut self) -> &mut Self {
        self.output_file_and_line = false;
        self
    }

    /// Leaves out the output variable declaration.
    pub fn disable_out_variable(&mut self) -> &mut Self {
        self.output_out_variable = false;
        self
    }

    /// Leaves out the final return statement.
    pub fn disable_return_statement(&mut self) -> &mut Self {
        self.output_return_statement = false;
        self
    }

    /// Leaves out the try/catch around the statements.
    pub fn disable_try_catch_block(&mut self) -> &mut Self {
        self.wrap_inside_try_catch = false;
        self
    }

    fn setup(&self, out: &mut Vec<String>) {
        if self.output_out_variable {
            out.push(format!("let {} = \"\";", self.options.output_var));
        }
        if self.output_file_and_line {
            out.push(format!("let {} = 1;", self.options.line_var));
            out.push(format!(
                "let {} = {};",
                self.options.file_name_var,
                js_stringify(&self.filename)
            ));
        }
        if self.wrap_inside_try_catch {
            out.push("try {".to_string());
        }
    }

    fn teardown(&self, out: &mut Vec<String>) {
        if self.wrap_inside_try_catch {
            out.push("} catch (error) {".to_string());
            out.push(format!(
                "{}(error, {}, {});",
                self.rethrow_call, self.options.file_name_var, self.options.line_var
            ));
            out.push("}".to_string());
        }
        if self.output_return_statement {
            out.push(format!("return {};", self.options.output_var));
        }
    }

    fn render(&self) -> String {
        let mut out = Vec::with_capacity(self.lines.len() + 8);
        out.extend(self.prefix.iter().flat_map(|text| text.split('\n')).map(str::to_string));
        self.setup(&mut out);
        out.extend(self.lines.iter().cloned());
        self.teardown(&mut out);
        out.extend(self.suffix.iter().flat_map(|text| text.split('\n')).map(str::to_string));
        out.join("\n")
    }

    /// Returns the final code.
    ///
    /// The first call renders and caches the code; later calls return the
    /// cached text even if more statements were written in between.
    pub fn flush(&self) -> &str {
        self.compiled.get_or_init(|| self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallPath;

    fn buffer() -> OutputBuffer {
        OutputBuffer::new("eval.edge", BufferOptions::new("out", CallPath::method("ctx", "reThrow")))
    }

    fn scaffold(body: &[&str]) -> String {
        let mut lines = vec![
            "let out = \"\";",
            "let $lineNumber = 1;",
            "let $filename = \"eval.edge\";",
            "try {",
        ];
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
    fn test_write_expression_to_output() {
        let mut buff = buffer();
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        assert_eq!(buff.flush(), scaffold(&["out += 'hello world';"]));
    }

    #[test]
    fn test_write_raw_text() {
        let mut buff = buffer();
        buff.output_raw("hi");
        assert_eq!(buff.flush(), scaffold(&["out += \"hi\";"]));
    }

    #[test]
    fn test_raw_text_keeps_single_quotes() {
        let mut buff = buffer();
        buff.output_raw("'hello world'");
        assert_eq!(buff.flush(), scaffold(&["out += \"'hello world'\";"]));
    }

    #[test]
    fn test_template_literal_expression() {
        let mut buff = buffer();
        buff.output_expression("ctx.escape(state.user)", "eval.edge", 1, true);
        assert_eq!(buff.flush(), scaffold(&["out += `${ctx.escape(state.user)}`;"]));
    }

    #[test]
    fn test_statements_and_line_updates() {
        let mut buff = buffer();
        buff.write_statement("if (username) {", "eval.edge", 1)
            .output_raw("hello world")
            .write_statement("}", "eval.edge", 3);
        assert_eq!(
            buff.flush(),
            scaffold(&["if (username) {", "out += \"hello world\";", "$lineNumber = 3;", "}"])
        );
    }

    #[test]
    fn test_filename_update() {
        let mut buff = buffer();
        buff.write_expression("const foo=\"bar\"", "bar.edge", 2);
        assert_eq!(
            buff.flush(),
            scaffold(&["$filename = \"bar.edge\";", "$lineNumber = 2;", "const foo=\"bar\";"])
        );
    }

    #[test]
    fn test_instrumentation_is_sparse() {
        let mut buff = buffer();
        buff.output_expression("a", "eval.edge", 2, false)
            .output_expression("b", "eval.edge", 2, false)
            .output_expression("c", "eval.edge", 4, false)
            .output_expression("d", "other.edge", 4, false)
            .output_expression("e", "other.edge", 0, false);
        assert_eq!(
            buff.flush(),
            scaffold(&[
                "$lineNumber = 2;",
                "out += a;",
                "out += b;",
                "$lineNumber = 4;",
                "out += c;",
                "$filename = \"other.edge\";",
                "out += d;",
                "out += e;",
            ])
        );
    }

    #[test]
    fn test_wrap_splits_lines() {
        let mut buff = buffer();
        buff.wrap("return function () {", "}");
        buff.wrap("// a\n// b", "// end");
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        let expected = format!(
            "return function () {{\n// a\n// b\n{}\n}}\n// end",
            scaffold(&["out += 'hello world';"])
        );
        assert_eq!(buff.flush(), expected);
    }

    #[test]
    fn test_disable_file_and_line_variables() {
        let mut buff = buffer();
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        buff.disable_file_and_line_variables();
        assert_eq!(
            buff.flush(),
            [
                "let out = \"\";",
                "try {",
                "out += 'hello world';",
                "} catch (error) {",
                "ctx.reThrow(error, $filename, $lineNumber);",
                "}",
                "return out;",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_disable_out_variable() {
        let mut buff = buffer();
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        buff.disable_out_variable();
        assert_eq!(
            buff.flush(),
            [
                "let $lineNumber = 1;",
                "let $filename = \"eval.edge\";",
                "try {",
                "out += 'hello world';",
                "} catch (error) {",
                "ctx.reThrow(error, $filename, $lineNumber);",
                "}",
                "return out;",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_disable_return_statement() {
        let mut buff = buffer();
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        buff.disable_return_statement();
        assert_eq!(
            buff.flush(),
            [
                "let out = \"\";",
                "let $lineNumber = 1;",
                "let $filename = \"eval.edge\";",
                "try {",
                "out += 'hello world';",
                "} catch (error) {",
                "ctx.reThrow(error, $filename, $lineNumber);",
                "}",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_disable_try_catch_block() {
        let mut buff = buffer();
        buff.output_expression("'hello world'", "eval.edge", 1, false);
        buff.disable_try_catch_block();
        assert_eq!(
            buff.flush(),
            [
                "let out = \"\";",
                "let $lineNumber = 1;",
                "let $filename = \"eval.edge\";",
                "out += 'hello world';",
                "return out;",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_create_child_buffer() {
        let mut parent = buffer();
        parent.output_raw("parent");
        let child = parent.create("eval-new.edge", BufferOverrides::default());
        assert_eq!(child.size(), 0);
        assert_eq!(child.filename(), "eval-new.edge");
        assert_eq!(child.output_variable_name(), "out");
        assert!(child.flush().contains("ctx.reThrow(error"));

        let renamed = parent.create(
            "x.edge",
            BufferOverrides {
                output_var: Some("html".into()),
                rethrow_call_path: Some(CallPath::Function("rethrow".into())),
            },
        );
        assert_eq!(renamed.output_variable_name(), "html");
        assert!(renamed.flush().contains("rethrow(error, $filename, $lineNumber);"));
        assert_eq!(parent.size(), 1);
    }

    #[test]
    fn test_size() {
        let mut buff = buffer();
        assert_eq!(buff.size(), 0);
        buff.output_raw("hello world");
        assert_eq!(buff.size(), 1);
    }

    #[test]
    fn test_flush_is_cached() {
        let mut buff = buffer();
        buff.write_expression("const foo=\"bar\"", "bar.edge", 2);
        let initial = buff.flush().to_string();
        assert!(buff.is_flushed());

        buff.write_expression("const bar=\"baz\"", "bar.edge", 3);
        assert_eq!(buff.flush(), initial);
        assert_eq!(buff.size(), 5);
    }
}
