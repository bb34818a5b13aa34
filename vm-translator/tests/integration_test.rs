//! End-to-end VM translation tests, driven directly against the library
//! API with literal program text.

use vm_translator::code_writer::CodeWriter;
use vm_translator::parser::{CommandType, Parser};

fn translate(filename: &str, src: &[&str]) -> String {
    let lines: Vec<String> = src.iter().map(|s| s.to_string()).collect();
    let mut parser = Parser::from_lines(&lines);
    let mut writer = CodeWriter::new();
    writer.set_filename(filename);
    let mut out = Vec::new();

    while parser.has_more_commands() {
        let line = parser.line_number();
        match parser.command_type() {
            CommandType::Arithmetic => {
                writer.write_arithmetic(&mut out, parser.arg1(), line).unwrap();
            }
            CommandType::Push | CommandType::Pop => {
                writer
                    .write_push_pop(
                        &mut out,
                        matches!(parser.command_type(), CommandType::Push),
                        parser.arg1(),
                        parser.arg2().unwrap(),
                        line,
                    )
                    .unwrap();
            }
            CommandType::Label => writer.write_label(&mut out, parser.arg1()).unwrap(),
            CommandType::Goto => writer.write_goto(&mut out, parser.arg1()).unwrap(),
            CommandType::If => writer.write_if(&mut out, parser.arg1()).unwrap(),
            CommandType::Function => {
                writer
                    .write_function(&mut out, parser.arg1(), parser.arg2().unwrap())
                    .unwrap();
            }
            CommandType::Call => {
                writer
                    .write_call(&mut out, parser.arg1(), parser.arg2().unwrap(), line)
                    .unwrap();
            }
            CommandType::Return => writer.write_return(&mut out).unwrap(),
        }
        parser.advance();
    }

    String::from_utf8(out).unwrap()
}

#[test]
fn scenario_push_constants_and_add() {
    // spec Scenario D: push constant 7; push constant 8; add
    let asm = translate("Add.vm", &["push constant 7", "push constant 8", "add"]);
    assert!(asm.contains("@7\nD=A"));
    assert!(asm.contains("@8\nD=A"));
    assert!(asm.contains("D=D+M"));
}

#[test]
fn scenario_function_with_constant_return() {
    // spec Scenario E: function Main.main 0; push constant 42; return
    let asm = translate(
        "Main.vm",
        &["function Main.main 0", "push constant 42", "return"],
    );
    assert!(asm.starts_with("(Main.main)"));
    assert!(asm.contains("@42\nD=A"));
    assert!(asm.contains("@R14\nA=M\n0;JMP"));
}

#[test]
fn comparison_produces_canonical_booleans() {
    let asm = translate("Cmp.vm", &["push constant 5", "push constant 3", "gt"]);
    assert!(asm.contains("D;JGT"));
    assert!(asm.contains("M=-1"));
    assert!(asm.contains("M=0"));
}

#[test]
fn labels_are_scoped_per_function() {
    let asm = translate(
        "Loop.vm",
        &[
            "function Loop.run 1",
            "label START",
            "goto START",
            "if-goto START",
        ],
    );
    assert!(asm.contains("(Loop.run$START)"));
    assert!(asm.contains("@Loop.run$START"));
}

#[test]
fn static_segment_is_mangled_with_file_basename() {
    let asm = translate("Foo.vm", &["push constant 1", "pop static 0"]);
    assert!(asm.contains("@Foo.0\nM=D"));
}

#[test]
fn nested_calls_get_unique_return_labels() {
    let asm = translate(
        "Main.vm",
        &[
            "call Sum.add 2",
            "push constant 1",
            "call Sum.add 2",
        ],
    );
    assert!(asm.contains("(Sum.add$ret.0)"));
    assert!(asm.contains("(Sum.add$ret.1)"));
}

#[test]
fn out_of_range_temp_index_is_fatal() {
    let lines: Vec<String> = vec!["push temp 9".to_string()];
    let mut parser = Parser::from_lines(&lines);
    let mut writer = CodeWriter::new();
    let mut out = Vec::new();
    let result = writer.write_push_pop(&mut out, true, parser.arg1(), parser.arg2().unwrap(), parser.line_number());
    assert!(result.is_err());
}
