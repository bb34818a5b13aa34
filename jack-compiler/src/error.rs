//! Error types for the Jack compiler.
//!
//! Mirrors `assembler::error::AssemblerError` / `vm_translator::error::VmTranslatorError`'s
//! shape: a flat enum, `Display` + `std::error::Error`, a plain `From<io::Error>`,
//! no `anyhow` inside the type itself so callers can match on failure kind.
//! Tokens are classified per spec §7 into lexical, syntactic, and semantic
//! failures; there is no encoding-error analogue in this crate.

use std::fmt;

#[derive(Debug)]
pub enum CompilerError {
    Io(std::io::Error),
    /// Unterminated string/comment, illegal identifier, integer out of range.
    Lexical { line: usize, message: String },
    /// Token mismatch against a grammar expectation.
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },
    /// Undeclared identifier used where a variable was required, or similar.
    Semantic { line: usize, message: String },
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Lexical { line, message } => write!(f, "line {line}: {message}"),
            Self::Syntax {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected {expected}, found {found}"),
            Self::Semantic { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for CompilerError {}

impl From<std::io::Error> for CompilerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
