//! Lowers VM commands to Hack assembly.
//!
//! Segment addressing, the binary/unary arithmetic scratch-register dance,
//! and the pass-through `// vm command:...` comments are carried over from
//! `projetc7::code_writer`. Branching, function/call/return, and the
//! bootstrap sequence are new, grounded on
//! `original_source/projects/08/vmtranslator.py`'s `CodeWriter`.

use std::io::Write;

use crate::error::VmTranslatorError;

#[derive(Clone, Copy)]
enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }

    fn pointer_register(&self) -> Option<&'static str> {
        match self {
            Self::Local => Some("LCL"),
            Self::Argument => Some("ARG"),
            Self::This => Some("THIS"),
            Self::That => Some("THAT"),
            _ => None,
        }
    }
}

/// Translates one VM translation unit's worth of commands into Hack assembly.
///
/// A single `CodeWriter` is reused across files in directory mode so that
/// `bool_counter` and `return_counter` stay globally unique, per §5's
/// requirement that label counters persist across files.
pub struct CodeWriter {
    filename: String,
    current_function: String,
    bool_counter: usize,
    return_counter: usize,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filename: String::new(),
            current_function: String::new(),
            bool_counter: 0,
            return_counter: 0,
        }
    }

    /// Sets the basename used for `static` mangling until the next call.
    pub fn set_filename(&mut self, path: &str) {
        let stem = std::path::Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(path);
        self.filename.clear();
        self.filename.push_str(stem);
    }

    /// `SP = 256; call Sys.init 0`, emitted exactly once before any file's
    /// code when translating a directory.
    pub fn write_bootstrap<W: Write>(&mut self, out: &mut W) -> Result<(), VmTranslatorError> {
        writeln!(out, "// bootstrap")?;
        writeln!(out, "@256")?;
        writeln!(out, "D=A")?;
        writeln!(out, "@SP")?;
        writeln!(out, "M=D")?;
        self.write_call(out, "Sys.init", 0, 0)
    }

    pub fn write_arithmetic<W: Write>(
        &mut self,
        out: &mut W,
        command: &str,
        line: usize,
    ) -> Result<(), VmTranslatorError> {
        writeln!(out, "// vm command: {command}")?;
        match command {
            "add" => self.write_binary_op(out, "D+M"),
            "sub" => self.write_binary_op(out, "D-M"),
            "and" => self.write_binary_op(out, "D&M"),
            "or" => self.write_binary_op(out, "D|M"),
            "neg" => self.write_unary_op(out, true),
            "not" => self.write_unary_op(out, false),
            "eq" => self.write_comparison(out, "JEQ"),
            "gt" => self.write_comparison(out, "JGT"),
            "lt" => self.write_comparison(out, "JLT"),
            _ => Err(VmTranslatorError::Command {
                line,
                message: format!("unknown arithmetic command: {command}"),
            }),
        }
    }

    fn write_binary_op<W: Write>(
        &mut self,
        out: &mut W,
        operation: &str,
    ) -> Result<(), VmTranslatorError> {
        write!(
            out,
            "@SP\nM=M-1\nA=M\nD=M\n\
             @R14\nM=D\n\
             @SP\nM=M-1\nA=M\nD=M\n\
             @R13\nM=D\n\
             @R13\nD=M\n\
             @R14\nD={operation}\n"
        )?;
        self.write_push_d(out)
    }

    fn write_unary_op<W: Write>(&mut self, out: &mut W, is_neg: bool) -> Result<(), VmTranslatorError> {
        write!(out, "@SP\nM=M-1\nA=M\nD=M\n")?;
        if is_neg {
            write!(out, "@0\nD=A-D\n")?;
        } else {
            write!(out, "D=!D\n")?;
        }
        self.write_push_d(out)
    }

    fn write_comparison<W: Write>(&mut self, out: &mut W, jump: &str) -> Result<(), VmTranslatorError> {
        let id = self.bool_counter;
        self.bool_counter += 1;
        let true_label = format!("{}$BOOL_TRUE.{id}", self.filename);
        let end_label = format!("{}$BOOL_END.{id}", self.filename);

        write!(
            out,
            "@SP\nM=M-1\nA=M\nD=M\n\
             @R14\nM=D\n\
             @SP\nM=M-1\nA=M\nD=M\n\
             @R13\nM=D\n\
             @R13\nD=M\n\
             @R14\nD=D-M\n\
             @{true_label}\n\
             D;{jump}\n\
             @SP\nA=M\nM=0\n\
             @SP\nM=M+1\n\
             @{end_label}\n\
             0;JMP\n\
             ({true_label})\n\
             @SP\nA=M\nM=-1\n\
             @SP\nM=M+1\n\
             ({end_label})\n"
        )?;
        Ok(())
    }

    pub fn write_push_pop<W: Write>(
        &mut self,
        out: &mut W,
        is_push: bool,
        segment: &str,
        index: i64,
        line: usize,
    ) -> Result<(), VmTranslatorError> {
        let verb = if is_push { "push" } else { "pop" };
        writeln!(out, "// vm command: {verb} {segment} {index}")?;

        let seg = Segment::from_str(segment).ok_or_else(|| VmTranslatorError::Command {
            line,
            message: format!("unknown segment: {segment}"),
        })?;

        match seg {
            Segment::Temp if !(0..=7).contains(&index) => {
                return Err(VmTranslatorError::Command {
                    line,
                    message: format!("temp index out of range [0,7]: {index}"),
                });
            }
            Segment::Pointer if !(0..=1).contains(&index) => {
                return Err(VmTranslatorError::Command {
                    line,
                    message: format!("pointer index out of range [0,1]: {index}"),
                });
            }
            _ => {}
        }

        if is_push {
            self.write_push(out, seg, index, line)
        } else {
            self.write_pop(out, seg, index, line)
        }
    }

    fn write_push<W: Write>(
        &mut self,
        out: &mut W,
        segment: Segment,
        index: i64,
        line: usize,
    ) -> Result<(), VmTranslatorError> {
        match segment {
            Segment::Constant => {
                write!(out, "@{index}\nD=A\n")?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let reg = segment.pointer_register().expect("checked above");
                write!(out, "@{reg}\nD=M\n@{index}\nA=D+A\nD=M\n")?;
            }
            Segment::Temp => {
                write!(out, "@R5\nD=A\n@{index}\nA=D+A\nD=M\n")?;
            }
            Segment::Pointer => {
                let reg = if index == 0 { "THIS" } else { "THAT" };
                write!(out, "@{reg}\nD=M\n")?;
            }
            Segment::Static => {
                write!(out, "@{}.{index}\nD=M\n", self.filename)?;
            }
        }
        let _ = line;
        self.write_push_d(out)
    }

    fn write_pop<W: Write>(
        &mut self,
        out: &mut W,
        segment: Segment,
        index: i64,
        line: usize,
    ) -> Result<(), VmTranslatorError> {
        match segment {
            Segment::Constant => {
                return Err(VmTranslatorError::Command {
                    line,
                    message: "cannot pop to constant segment".to_string(),
                });
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let reg = segment.pointer_register().expect("checked above");
                write!(out, "@{reg}\nD=M\n@{index}\nD=D+A\n@R13\nM=D\n")?;
                self.write_pop_to_d(out)?;
                write!(out, "@R13\nA=M\nM=D\n")?;
            }
            Segment::Temp => {
                write!(out, "@R5\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n")?;
                self.write_pop_to_d(out)?;
                write!(out, "@R13\nA=M\nM=D\n")?;
            }
            Segment::Pointer => {
                let reg = if index == 0 { "THIS" } else { "THAT" };
                self.write_pop_to_d(out)?;
                write!(out, "@{reg}\nM=D\n")?;
            }
            Segment::Static => {
                self.write_pop_to_d(out)?;
                write!(out, "@{}.{index}\nM=D\n", self.filename)?;
            }
        }
        Ok(())
    }

    fn write_push_d<W: Write>(&self, out: &mut W) -> Result<(), VmTranslatorError> {
        write!(out, "@SP\nA=M\nM=D\n@SP\nM=M+1\n")?;
        Ok(())
    }

    fn write_pop_to_d<W: Write>(&self, out: &mut W) -> Result<(), VmTranslatorError> {
        write!(out, "@SP\nM=M-1\nA=M\nD=M\n")?;
        Ok(())
    }

    fn scoped_label(&self, name: &str) -> String {
        if self.current_function.is_empty() {
            format!("{}${name}", self.filename)
        } else {
            format!("{}${name}", self.current_function)
        }
    }

    pub fn write_label<W: Write>(&mut self, out: &mut W, name: &str) -> Result<(), VmTranslatorError> {
        writeln!(out, "({})", self.scoped_label(name))?;
        Ok(())
    }

    pub fn write_goto<W: Write>(&mut self, out: &mut W, name: &str) -> Result<(), VmTranslatorError> {
        writeln!(out, "@{}", self.scoped_label(name))?;
        writeln!(out, "0;JMP")?;
        Ok(())
    }

    pub fn write_if<W: Write>(&mut self, out: &mut W, name: &str) -> Result<(), VmTranslatorError> {
        write!(out, "@SP\nM=M-1\nA=M\nD=M\n")?;
        writeln!(out, "@{}", self.scoped_label(name))?;
        writeln!(out, "D;JNE")?;
        Ok(())
    }

    pub fn write_function<W: Write>(
        &mut self,
        out: &mut W,
        name: &str,
        n_locals: i64,
    ) -> Result<(), VmTranslatorError> {
        self.current_function = name.to_string();
        writeln!(out, "({name})")?;
        for _ in 0..n_locals {
            write!(out, "@0\nD=A\n")?;
            self.write_push_d(out)?;
        }
        Ok(())
    }

    pub fn write_call<W: Write>(
        &mut self,
        out: &mut W,
        name: &str,
        n_args: i64,
        _line: usize,
    ) -> Result<(), VmTranslatorError> {
        let return_label = format!("{name}$ret.{}", self.return_counter);
        self.return_counter += 1;

        write!(out, "@{return_label}\nD=A\n")?;
        self.write_push_d(out)?;
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            write!(out, "@{reg}\nD=M\n")?;
            self.write_push_d(out)?;
        }

        write!(out, "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n", 5 + n_args)?;
        write!(out, "@SP\nD=M\n@LCL\nM=D\n")?;
        writeln!(out, "@{name}")?;
        writeln!(out, "0;JMP")?;
        writeln!(out, "({return_label})")?;
        Ok(())
    }

    pub fn write_return<W: Write>(&mut self, out: &mut W) -> Result<(), VmTranslatorError> {
        // endFrame in R13; retAddr in R14, read before the arg-0 slot is
        // overwritten (an n=0 callee leaves only 5 cells between ARG and LCL).
        write!(out, "@LCL\nD=M\n@R13\nM=D\n")?;
        write!(out, "@5\nD=D-A\nA=D\nD=M\n@R14\nM=D\n")?;

        write!(out, "@SP\nM=M-1\nA=M\nD=M\n@ARG\nA=M\nM=D\n")?;
        write!(out, "@ARG\nD=M+1\n@SP\nM=D\n")?;

        for reg in ["THAT", "THIS", "ARG", "LCL"] {
            write!(out, "@R13\nM=M-1\nA=M\nD=M\n@{reg}\nM=D\n")?;
        }

        write!(out, "@R14\nA=M\n0;JMP\n")?;
        Ok(())
    }
}
