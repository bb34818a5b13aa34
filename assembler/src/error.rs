//! Error types for the Hack assembler.
//!
//! Mirrors [`crate::parser::ParserError`]'s shape (`Debug` + `Display` +
//! `std::error::Error`, plain `From` conversions) but adds the file-name and
//! line-number context the top-level driver needs to produce the diagnostics
//! required by the assembler's failure modes: unknown mnemonics, malformed
//! C-instructions, and address overflow are all fatal at the point of
//! detection.

use std::fmt;

use crate::parser::ParserError;

#[derive(Debug)]
pub enum AssemblerError {
    Io(std::io::Error),
    /// A parser-level failure (bad command shape), with the 1-indexed source line.
    Parse { line: usize, source: ParserError },
    /// An A-instruction address that does not fit in 15 bits.
    AddressOverflow { line: usize, value: u32 },
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse { line, source } => write!(f, "line {line}: {source}"),
            Self::AddressOverflow { line, value } => {
                write!(f, "line {line}: address {value} exceeds 15-bit range (max 32767)")
            }
        }
    }
}

impl std::error::Error for AssemblerError {}

impl From<std::io::Error> for AssemblerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
