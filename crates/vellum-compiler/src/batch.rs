//! Batch compilation of independent units.
//!
//! A [`CompileUnit`] carries everything one template needs: its tokens, the
//! preparsed expressions those tokens reference, and the options. Units share
//! nothing but the tag registry, so they compile side by side.
//!
//! # Features
//!
//! - [`ParallelCompiler`] compiles in-memory units on a rayon pool (`parallel`)
//! - [`AsyncCompiler`] reads unit files with tokio and compiles them on the
//!   blocking pool (`async`)
//!
//! Both return one result per unit, in input order. A failing unit never
//! affects the others.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{BufferOptions, ParserOptions};
use crate::error::CompileError;
use crate::lexer::Token;
use crate::parser::{PreparsedExpressions, TagRegistry, TemplateParser};

/// One template ready for compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileUnit {
    /// Template file the tokens come from
    pub filename: String,
    /// Tokenizer output
    pub tokens: Vec<Token>,
    /// Parsed trees for every expression in `tokens`
    #[serde(default)]
    pub expressions: PreparsedExpressions,
    /// Parser options
    #[serde(default)]
    pub options: ParserOptions,
    /// Buffer options
    #[serde(default)]
    pub buffer: BufferOptions,
}

impl CompileUnit {
    /// Loads a unit from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Compiles the unit with the given tag plugins.
    pub fn compile(self, tags: Arc<TagRegistry>) -> Result<CompiledUnit, UnitError> {
        let CompileUnit {
            filename,
            tokens,
            expressions,
            options,
            buffer,
        } = self;

        let mut parser = TemplateParser::new(tags, Arc::new(expressions), options);
        match parser.compile_tokens(&tokens, &filename, buffer) {
            Ok(code) => Ok(CompiledUnit { filename, code }),
            Err(source) => Err(UnitError::Compile { filename, source }),
        }
    }
}

/// The output code of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledUnit {
    /// Template file the code was compiled from
    pub filename: String,
    /// Generated code
    pub code: String,
}

impl CompiledUnit {
    /// Relative path for the generated code: the template's path with a `.js`
    /// extension. Root, prefix and `..` components are dropped so the path
    /// always stays inside the output directory.
    pub fn output_path(&self) -> PathBuf {
        let mut path: PathBuf = Path::new(&self.filename)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        if path.file_name().is_none() {
            path.push("template");
        }
        path.with_extension("js")
    }
}

/// Errors raised while loading or compiling a unit.
#[derive(Debug, Error)]
pub enum UnitError {
    /// The template failed to compile
    #[error("{source}")]
    Compile {
        /// Template file
        filename: String,
        /// Compilation error
        #[source]
        source: CompileError,
    },

    /// The unit file could not be read or the output written
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// The unit file is not a valid compilation unit
    #[error("{}: invalid compilation unit: {source}", .path.display())]
    Json {
        /// Unit file
        path: PathBuf,
        /// Deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The blocking compilation task panicked or was cancelled
    #[cfg(feature = "async")]
    #[error("compilation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl UnitError {
    /// The compilation error, when the unit got as far as compiling.
    pub fn compile_error(&self) -> Option<&CompileError> {
        match self {
            UnitError::Compile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn log_summary<T>(results: &[Result<T, UnitError>]) {
    let failed = results.iter().filter(|result| result.is_err()).count();
    info!(
        units = results.len(),
        succeeded = results.len() - failed,
        failed,
        "batch compiled"
    );
}

/// Compiles units on a rayon thread pool.
#[cfg(feature = "parallel")]
pub struct ParallelCompiler {
    tags: Arc<TagRegistry>,
    pool: Option<rayon::ThreadPool>,
}

#[cfg(feature = "parallel")]
impl ParallelCompiler {
    /// Creates a compiler running on the global rayon pool.
    pub fn new(tags: Arc<TagRegistry>) -> Self {
        Self { tags, pool: None }
    }

    /// Creates a compiler with its own pool of `num_threads` threads.
    pub fn with_threads(
        tags: Arc<TagRegistry>,
        num_threads: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?;
        Ok(Self {
            tags,
            pool: Some(pool),
        })
    }

    /// Compiles every unit. Results are in the order of `units`.
    pub fn compile_all(&self, units: Vec<CompileUnit>) -> Vec<Result<CompiledUnit, UnitError>> {
        use rayon::prelude::*;

        let run = || -> Vec<Result<CompiledUnit, UnitError>> {
            units
                .into_par_iter()
                .map(|unit| unit.compile(Arc::clone(&self.tags)))
                .collect()
        };

        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        log_summary(&results);
        results
    }
}

#[cfg(feature = "parallel")]
impl std::fmt::Debug for ParallelCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelCompiler")
            .field("tags", &self.tags)
            .field("threads", &self.pool.as_ref().map(|pool| pool.current_num_threads()))
            .finish()
    }
}

/// Compiles unit files without blocking the async runtime.
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct AsyncCompiler {
    tags: Arc<TagRegistry>,
}

#[cfg(feature = "async")]
impl AsyncCompiler {
    /// Creates a compiler using the given tag plugins.
    pub fn new(tags: Arc<TagRegistry>) -> Self {
        Self { tags }
    }

    /// Reads and deserializes a unit file.
    pub async fn load_unit(&self, path: impl AsRef<Path>) -> Result<CompileUnit, UnitError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| UnitError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        CompileUnit::from_json(&json).map_err(|source| UnitError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a unit file and compiles it on the blocking pool.
    pub async fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompiledUnit, UnitError> {
        let unit = self.load_unit(path).await?;
        let tags = Arc::clone(&self.tags);
        tokio::task::spawn_blocking(move || unit.compile(tags)).await?
    }

    /// Compiles several unit files concurrently. Results are in the order of
    /// `paths`.
    pub async fn compile_files(
        &self,
        paths: &[impl AsRef<Path>],
    ) -> Vec<Result<CompiledUnit, UnitError>> {
        let futures: Vec<_> = paths.iter().map(|path| self.compile_file(path)).collect();
        let results = futures::future::join_all(futures).await;
        log_summary(&results);
        results
    }

    /// Writes `compiled` below `dir` at its [`output_path`](CompiledUnit::output_path),
    /// creating missing directories, and returns the written path.
    pub async fn write_output(
        &self,
        compiled: &CompiledUnit,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, UnitError> {
        let path = dir.as_ref().join(compiled.output_path());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| UnitError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, &compiled.code)
            .await
            .map_err(|source| UnitError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
