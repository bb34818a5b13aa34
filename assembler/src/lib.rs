//! Hack assembler: translates Hack assembly (`.asm`) into 16-bit binary
//! machine instructions (`.hack`), one instruction per line.
//!
//! The translation is a two-pass process over [`parser::ParserLines`]:
//! pass one binds every `(LABEL)` to the ROM address of the instruction that
//! follows it; pass two resolves every `@symbol` (numeric literal, predefined
//! symbol, label, or newly-allocated variable) and emits the final binary
//! image via [`code`].

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;
