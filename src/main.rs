// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! vellum CLI - compiles tokenized templates into render functions
//!
//! Every argument is a compilation unit file: the JSON produced by the
//! template tokenizer and expression parser for one template. Compiled code
//! goes to stdout, or into `--out-dir` as one `.js` file per unit.
//!
//! No tag plugins are registered: units containing `@tag` tokens fail with
//! `E_UNKNOWN_TAG`. Templates using tags are compiled through the library
//! with a populated `TagRegistry`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vellum_compiler::{AsyncCompiler, CompiledUnit, TagRegistry, UnitError};

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Compiles tokenized templates into instrumented JavaScript render functions",
    long_about = "Compiles tokenized templates into instrumented JavaScript render functions.\n\n\
        No tag plugins are registered, so units containing tag tokens fail with E_UNKNOWN_TAG. \
        Compile such templates through the vellum-compiler library with a populated TagRegistry.",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Compilation unit files (JSON)
    #[arg(required = true)]
    units: Vec<PathBuf>,

    /// Write one `.js` file per unit into this directory instead of stdout,
    /// mirroring the template paths
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Print the compiled units as JSON
    #[arg(long, conflicts_with = "out_dir")]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("vellum=debug,vellum_compiler=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = &cli.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    debug!(units = cli.units.len(), out_dir = ?cli.out_dir, "compiling units");
    let compiler = AsyncCompiler::new(Arc::new(TagRegistry::new()));
    let results = compiler.compile_files(&cli.units).await;

    let mut compiled = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (path, result) in cli.units.iter().zip(results) {
        match result {
            Ok(unit) => compiled.push(unit),
            Err(err) => {
                failed += 1;
                report(path, &err);
            }
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&compiled).context("failed to serialize output")?;
        println!("{json}");
    } else if let Some(dir) = &cli.out_dir {
        let mut claimed = HashSet::new();
        for unit in &compiled {
            let target = unit.output_path();
            if !claimed.insert(target.clone()) {
                failed += 1;
                eprintln!(
                    "{}: {} would overwrite {} written by an earlier unit",
                    "Error".red().bold(),
                    unit.filename,
                    dir.join(&target).display()
                );
                continue;
            }
            match compiler.write_output(unit, dir).await {
                Ok(path) => eprintln!("{} {}", "wrote".green().bold(), path.display()),
                Err(err) => {
                    failed += 1;
                    eprintln!("{}: {}", "Error".red().bold(), err);
                }
            }
        }
    } else {
        print_units(&compiled);
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Prints `filename:line:column code message` for template errors.
fn report(path: &Path, err: &UnitError) {
    match err {
        UnitError::Compile { filename, source } => {
            let (file, line, column) = match source.location() {
                Some(location) if !location.filename.is_empty() => {
                    (location.filename.as_str(), location.line, location.column)
                }
                Some(location) => (filename.as_str(), location.line, location.column),
                None => (filename.as_str(), 0, 0),
            };
            eprintln!(
                "{}:{}:{} {} {}",
                file.cyan(),
                line.yellow(),
                column.yellow(),
                source.code().red().bold(),
                source
            );
        }
        _ => {
            eprintln!("{} {}: {}", "Error".red().bold(), path.display().dimmed(), err);
        }
    }
}

fn print_units(units: &[CompiledUnit]) {
    let with_headers = units.len() > 1;
    for unit in units {
        if with_headers {
            println!("// {}", unit.filename);
        }
        println!("{}", unit.code);
    }
}
