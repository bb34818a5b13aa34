//! Jack compiler: tokenizes and compiles Jack source classes directly into
//! VM code in a single recursive-descent pass, driven by a dual symbol-table
//! model (class-level `static`/`field` kinds, subroutine-level
//! `argument`/`local` kinds).
//!
//! [`tokenizer::Tokenizer`] is a pull iterator with no lookahead of its own;
//! [`compilation_engine::CompilationEngine`] holds `current`/`next` and
//! pulls from it as it walks the grammar, emitting VM commands as a side
//! effect of parsing rather than building an intermediate AST.

pub mod compilation_engine;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
