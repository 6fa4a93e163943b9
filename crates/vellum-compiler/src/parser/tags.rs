//! Tag plugins.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::TemplateParser;
use crate::buffer::OutputBuffer;
use crate::error::Result;
use crate::lexer::TagToken;

/// Compiles one kind of `@tag` into output code.
///
/// Plugins get the parser so they can rewrite their argument
/// ([`TemplateParser::generate_ast`], [`TemplateParser::transform_ast`],
/// [`TemplateParser::stringify`]) and compile their children
/// ([`TemplateParser::process_token`]).
pub trait TagCompiler: Send + Sync {
    /// Writes the code for `token` into `buffer`.
    fn compile(
        &self,
        parser: &mut TemplateParser,
        buffer: &mut OutputBuffer,
        token: &TagToken,
    ) -> Result<()>;
}

impl<F> TagCompiler for F
where
    F: Fn(&mut TemplateParser, &mut OutputBuffer, &TagToken) -> Result<()> + Send + Sync,
{
    fn compile(
        &self,
        parser: &mut TemplateParser,
        buffer: &mut OutputBuffer,
        token: &TagToken,
    ) -> Result<()> {
        self(parser, buffer, token)
    }
}

/// Tag plugins by name. Read-only once compilation starts, so one registry
/// can be shared by every unit.
#[derive(Clone, Default)]
pub struct TagRegistry {
    tags: FxHashMap<String, Arc<dyn TagCompiler>>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tag` under `name`, replacing any previous plugin.
    pub fn register(&mut self, name: impl Into<String>, tag: impl TagCompiler + 'static) -> &mut Self {
        self.tags.insert(name.into(), Arc::new(tag));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, tag: impl TagCompiler + 'static) -> Self {
        self.register(name, tag);
        self
    }

    /// Looks up the plugin for `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn TagCompiler>> {
        self.tags.get(name)
    }

    /// Returns true when a plugin is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Registered tag names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("tags", &self.names())
            .finish()
    }
}
