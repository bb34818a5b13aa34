//! VM Translator - Main Entry Point
//!
//! Translates one `.vm` file, or every `.vm` file under a directory, into a
//! single Hack assembly program written to standard output.
//!
//! # Usage
//! ```bash
//! cargo run <input.vm|directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use log::debug;

use vm_translator::code_writer::CodeWriter;
use vm_translator::error::VmTranslatorError;
use vm_translator::parser::{CommandType, Parser};

fn read_lines(path: &Path) -> Result<Vec<String>, VmTranslatorError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Collects `.vm` files under `dir`, recursing into subdirectories (matching
/// `original_source/projects/08/vmtranslator.py`'s `path.glob('**/*.vm')`),
/// sorted lexicographically at each level so directory-mode translation is
/// deterministic across runs regardless of `read_dir`'s unspecified order.
fn collect_vm_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut files = Vec::new();
    for path in entries {
        if path.is_dir() {
            files.extend(collect_vm_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "vm") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Translates every command in `path` through `writer`, emitting assembly to `out`.
fn translate_file<W: Write>(
    path: &Path,
    writer: &mut CodeWriter,
    out: &mut W,
) -> Result<(), VmTranslatorError> {
    let lines = read_lines(path)?;
    writer.set_filename(path.to_string_lossy().as_ref());
    let mut parser = Parser::from_lines(&lines);

    while parser.has_more_commands() {
        let line = parser.line_number();
        match parser.command_type() {
            CommandType::Arithmetic => {
                writer.write_arithmetic(out, parser.arg1(), line)?;
            }
            CommandType::Push | CommandType::Pop => {
                let segment = parser.arg1().to_string();
                let index = parser.arg2().ok_or_else(|| VmTranslatorError::Command {
                    line,
                    message: "push/pop requires a numeric index".to_string(),
                })?;
                writer.write_push_pop(
                    out,
                    matches!(parser.command_type(), CommandType::Push),
                    &segment,
                    index,
                    line,
                )?;
            }
            CommandType::Label => writer.write_label(out, parser.arg1())?,
            CommandType::Goto => writer.write_goto(out, parser.arg1())?,
            CommandType::If => writer.write_if(out, parser.arg1())?,
            CommandType::Function => {
                let name = parser.arg1().to_string();
                let n_locals = parser.arg2().ok_or_else(|| VmTranslatorError::Command {
                    line,
                    message: "function requires a local count".to_string(),
                })?;
                writer.write_function(out, &name, n_locals)?;
            }
            CommandType::Call => {
                let name = parser.arg1().to_string();
                let n_args = parser.arg2().ok_or_else(|| VmTranslatorError::Command {
                    line,
                    message: "call requires an argument count".to_string(),
                })?;
                writer.write_call(out, &name, n_args, line)?;
            }
            CommandType::Return => writer.write_return(out)?,
        }
        parser.advance();
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm|directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut writer = CodeWriter::new();

    if input.is_dir() {
        let files = collect_vm_files(input).with_context(|| format!("reading directory {}", input.display()))?;
        writer
            .write_bootstrap(&mut out)
            .with_context(|| "emitting bootstrap".to_string())?;
        debug!("directory mode: {} vm files", files.len());
        for file in &files {
            translate_file(file, &mut writer, &mut out)
                .with_context(|| format!("translating {}", file.display()))?;
        }
    } else {
        translate_file(input, &mut writer, &mut out)
            .with_context(|| format!("translating {}", input.display()))?;
    }

    out.flush()?;
    Ok(())
}
