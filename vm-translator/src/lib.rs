//! VM translator: lowers the nand2tetris stack-machine VM language into Hack
//! assembly.
//!
//! A single [`parser::Parser`] walks pre-cleaned source lines; a
//! [`code_writer::CodeWriter`] emits the corresponding assembly, tracking the
//! current function (for `label`/`goto`/`if-goto` scoping) and monotonically
//! increasing counters for comparison and call-return labels that must stay
//! unique across an entire directory of files.

pub mod code_writer;
pub mod error;
pub mod parser;

#[cfg(test)]
mod tests {
    use crate::code_writer::CodeWriter;
    use crate::parser::{CommandType, Parser};

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_arithmetic_program() {
        // push constant 7; push constant 8; add
        let src = lines(&["push constant 7", "push constant 8", "add"]);
        let mut parser = Parser::from_lines(&src);
        let mut writer = CodeWriter::new();
        writer.set_filename("Add.vm");
        let mut out = Vec::new();

        while parser.has_more_commands() {
            match parser.command_type() {
                CommandType::Push => {
                    writer
                        .write_push_pop(&mut out, true, parser.arg1(), parser.arg2().unwrap(), 1)
                        .unwrap();
                }
                CommandType::Arithmetic => {
                    writer.write_arithmetic(&mut out, parser.arg1(), 1).unwrap();
                }
                _ => unreachable!(),
            }
            parser.advance();
        }

        let asm = String::from_utf8(out).unwrap();
        assert!(asm.contains("@7"));
        assert!(asm.contains("@8"));
        assert!(asm.contains("D=D+M"));
    }

    #[test]
    fn test_function_call_and_return_round_trip() {
        // function Main.main 0; push constant 42; return
        let src = lines(&["function Main.main 0", "push constant 42", "return"]);
        let mut parser = Parser::from_lines(&src);
        let mut writer = CodeWriter::new();
        writer.set_filename("Main.vm");
        let mut out = Vec::new();

        while parser.has_more_commands() {
            match parser.command_type() {
                CommandType::Function => {
                    writer
                        .write_function(&mut out, parser.arg1(), parser.arg2().unwrap())
                        .unwrap();
                }
                CommandType::Push => {
                    writer
                        .write_push_pop(&mut out, true, parser.arg1(), parser.arg2().unwrap(), 1)
                        .unwrap();
                }
                CommandType::Return => writer.write_return(&mut out).unwrap(),
                _ => unreachable!(),
            }
            parser.advance();
        }

        let asm = String::from_utf8(out).unwrap();
        assert!(asm.starts_with("(Main.main)"));
        assert!(asm.contains("@42"));
        assert!(asm.contains("0;JMP"));
    }
}
