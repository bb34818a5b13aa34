//! Error types for the VM translator.
//!
//! Follows the same shape as `assembler::error::AssemblerError`: a flat enum
//! carrying file/line context, `Display` + `std::error::Error`, no `anyhow`
//! inside the type itself so callers can match on failure kind.

use std::fmt;

#[derive(Debug)]
pub enum VmTranslatorError {
    Io(std::io::Error),
    /// An unrecognized command, segment name, or malformed index, with the
    /// 1-indexed source line it came from.
    Command { line: usize, message: String },
}

impl fmt::Display for VmTranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Command { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for VmTranslatorError {}

impl From<std::io::Error> for VmTranslatorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
