//! Jack Compiler - Main Entry Point
//!
//! Compiles one `.jack` file, or every `.jack` file under a directory, into
//! VM code. Unlike the assembler and VM translator, which write a single
//! stream to standard output, the Jack compiler writes one `.vm` file per
//! `.jack` input, alongside its source (§6).
//!
//! # Usage
//! ```bash
//! cargo run <input.jack|directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use log::debug;

use jack_compiler::compilation_engine::CompilationEngine;
use jack_compiler::error::CompilerError;

/// Collects `.jack` files under `dir`, recursing into subdirectories
/// (matching `original_source/projects/10/compiler.py` and
/// `projects/11/compiler.py`'s `path.glob('**/*.jack')`), sorted
/// lexicographically at each level so directory-mode compilation is
/// deterministic across runs regardless of `read_dir`'s unspecified order.
fn collect_jack_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut files = Vec::new();
    for path in entries {
        if path.is_dir() {
            files.extend(collect_jack_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "jack") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Compiles a single `.jack` file, writing its VM output to a sibling
/// `.vm` file of the same basename.
fn compile_file(path: &Path) -> Result<(), CompilerError> {
    let source = fs::read_to_string(path)?;
    let out_path = path.with_extension("vm");
    let file = fs::File::create(&out_path)?;
    let mut writer = BufWriter::new(file);

    let mut engine = CompilationEngine::new(&source, &mut writer)?;
    engine.compile_class()?;
    engine.flush()?;
    debug!("compiled {} -> {}", path.display(), out_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack|directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);

    if input.is_dir() {
        let files = collect_jack_files(input).with_context(|| format!("reading directory {}", input.display()))?;
        debug!("directory mode: {} jack files", files.len());
        for file in &files {
            compile_file(file).with_context(|| format!("compiling {}", file.display()))?;
        }
    } else {
        compile_file(input).with_context(|| format!("compiling {}", input.display()))?;
    }

    Ok(())
}
