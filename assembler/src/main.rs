//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language.
//!
//! # Architecture
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols
//!
//! # Usage
//! ```bash
//! cargo run <input.asm>
//! ```
//! Binary output is written to standard output, one 16-character line per
//! instruction; filesystem traversal and output-file naming are external
//! concerns left to the invoking shell.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process;

use anyhow::Context;
use log::{debug, trace};

use assembler::code;
use assembler::error::AssemblerError;
use assembler::parser::{CommandType, ParserLines};
use assembler::symbol_table::SymbolTable;

/// Reads assembly file into memory
fn read_lines(path: &str) -> Result<Vec<String>, AssemblerError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// First pass: Build symbol table with label addresses
///
/// Scans through all lines and records the ROM address of each label.
/// Label definitions (L-commands) don't generate code, so they don't
/// increment the ROM address counter.
fn first_pass(lines: &[String], symbol_table: &mut SymbolTable) -> Result<(), AssemblerError> {
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        let command = parser.command_type().map_err(|source| AssemblerError::Parse {
            line: parser.line_number(),
            source,
        })?;
        match command {
            CommandType::LCommand => {
                let symbol = parser.symbol().map_err(|source| AssemblerError::Parse {
                    line: parser.line_number(),
                    source,
                })?;
                symbol_table.add_entry(symbol, rom_address);
                trace!("label {symbol} bound to ROM address {rom_address}");
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    debug!("pass 1 complete: {} ROM instructions", rom_address);
    Ok(())
}

/// Second pass: Generate machine code
///
/// Translates each instruction to binary:
/// - A-commands: Resolve symbols to addresses
/// - C-commands: Encode dest, comp, and jump fields
/// - L-commands: Skip — they were already bound to an address in pass 1
///   and carry no machine code of their own.
fn second_pass<W: Write>(
    lines: &[String],
    symbol_table: &mut SymbolTable,
    writer: &mut W,
) -> Result<(), AssemblerError> {
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        let line = parser.line_number();
        let command = parser
            .command_type()
            .map_err(|source| AssemblerError::Parse { line, source })?;

        match command {
            CommandType::ACommand => {
                let symbol = parser
                    .symbol()
                    .map_err(|source| AssemblerError::Parse { line, source })?;

                let address = if let Ok(value) = symbol.parse::<u32>() {
                    if value > 32767 {
                        return Err(AssemblerError::AddressOverflow { line, value });
                    }
                    u16::try_from(value).expect("checked above")
                } else {
                    symbol_table.get_or_insert(symbol)
                };

                let instruction = code::encode_a_instruction(address);
                writeln!(writer, "{instruction}")?;
            }
            CommandType::CCommand => {
                let dest = parser
                    .dest()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");
                let comp = parser
                    .comp()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");
                let jump = parser
                    .jump()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");

                let instruction =
                    code::encode_c_instruction(dest, comp, jump).ok_or_else(|| {
                        AssemblerError::Parse {
                            line,
                            source: assembler::parser::ParserError::InvalidState(
                                "unrecognized dest/comp/jump mnemonic",
                            ),
                        }
                    })?;
                writeln!(writer, "{instruction}")?;
            }
            CommandType::LCommand => {
                // No code to emit; already bound to an address in pass 1.
                continue;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.asm>", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];

    let lines = read_lines(input_path).with_context(|| format!("reading {input_path}"))?;

    let mut symbol_table = SymbolTable::new();

    first_pass(&lines, &mut symbol_table).with_context(|| format!("pass 1 over {input_path}"))?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    second_pass(&lines, &mut symbol_table, &mut writer)
        .with_context(|| format!("pass 2 over {input_path}"))?;
    debug!("pass 2 complete for {input_path}");

    Ok(())
}
