//! Parser for the VM language.
//!
//! Cleans comments and whitespace once up front, then hands out commands one
//! at a time with their parts pre-split to avoid re-parsing on every accessor
//! call, in the same spirit as `projetc7`'s parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

struct Line {
    number: usize,
    parts: Vec<String>,
}

pub struct Parser {
    lines: Vec<Line>,
    current: usize,
}

impl Parser {
    /// Builds a parser from raw source lines, stripping `//` comments and
    /// blank lines while remembering each surviving command's 1-indexed
    /// source line for diagnostics.
    #[must_use]
    pub fn from_lines(source: &[String]) -> Self {
        let mut lines = Vec::new();
        for (i, raw) in source.iter().enumerate() {
            let clean = raw.find("//").map_or(raw.as_str(), |pos| &raw[..pos]);
            let trimmed = clean.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parts = trimmed.split_whitespace().map(str::to_string).collect();
            lines.push(Line {
                number: i + 1,
                parts,
            });
        }

        Self { lines, current: 0 }
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.current < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current += 1;
    }

    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.lines[self.current].number
    }

    fn parts(&self) -> &[String] {
        &self.lines[self.current].parts
    }

    #[inline]
    #[must_use]
    pub fn command_type(&self) -> CommandType {
        match self.parts()[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        }
    }

    /// The command mnemonic (arithmetic), segment name, label name, or
    /// function name, depending on `command_type()`.
    #[inline]
    #[must_use]
    pub fn arg1(&self) -> &str {
        let parts = self.parts();
        match self.command_type() {
            CommandType::Arithmetic => &parts[0],
            CommandType::Return => "",
            _ => &parts[1],
        }
    }

    /// The numeric index/count argument, for commands that carry one.
    #[must_use]
    pub fn arg2(&self) -> Option<i64> {
        let parts = self.parts();
        match self.command_type() {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                parts.get(2).and_then(|s| s.parse().ok())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strips_comments_and_blanks() {
        let src = lines(&["// header", "", "push constant 7 // load 7", "add"]);
        let mut parser = Parser::from_lines(&src);

        assert!(parser.has_more_commands());
        assert_eq!(parser.command_type(), CommandType::Push);
        assert_eq!(parser.arg1(), "constant");
        assert_eq!(parser.arg2(), Some(7));
        assert_eq!(parser.line_number(), 3);

        parser.advance();
        assert_eq!(parser.command_type(), CommandType::Arithmetic);
        assert_eq!(parser.arg1(), "add");
        assert_eq!(parser.line_number(), 4);

        parser.advance();
        assert!(!parser.has_more_commands());
    }

    #[test]
    fn test_all_branching_and_call_commands() {
        let src = lines(&[
            "label LOOP",
            "goto LOOP",
            "if-goto LOOP",
            "function Main.main 2",
            "call Main.helper 3",
            "return",
        ]);
        let mut parser = Parser::from_lines(&src);

        assert_eq!(parser.command_type(), CommandType::Label);
        assert_eq!(parser.arg1(), "LOOP");
        parser.advance();

        assert_eq!(parser.command_type(), CommandType::Goto);
        parser.advance();

        assert_eq!(parser.command_type(), CommandType::If);
        parser.advance();

        assert_eq!(parser.command_type(), CommandType::Function);
        assert_eq!(parser.arg1(), "Main.main");
        assert_eq!(parser.arg2(), Some(2));
        parser.advance();

        assert_eq!(parser.command_type(), CommandType::Call);
        assert_eq!(parser.arg1(), "Main.helper");
        assert_eq!(parser.arg2(), Some(3));
        parser.advance();

        assert_eq!(parser.command_type(), CommandType::Return);
    }
}
