//! Instruction filtering.
//!
//! Any text is a valid program: every character outside `><+-.,[]` is a
//! comment and is dropped. The surviving instructions remember where they
//! came from so errors can be shown against the original source.

use std::fmt;

/// One of the eight Brainfuck instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Inc,
    /// `-`
    Dec,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopStart,
    /// `]`
    LoopEnd,
}

impl Instruction {
    /// Map a source character to its instruction, or `None` for comment text.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '>' => Instruction::Right,
            '<' => Instruction::Left,
            '+' => Instruction::Inc,
            '-' => Instruction::Dec,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Inc => '+',
            Instruction::Dec => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A filtered, immutable instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    // Char offset in the source text of each instruction.
    offsets: Vec<usize>,
}

impl Program {
    /// Keep only instruction characters from `source`, in their original order.
    pub fn parse(source: &str) -> Self {
        let (instructions, offsets): (Vec<_>, Vec<_>) = source
            .chars()
            .enumerate()
            .filter_map(|(offset, c)| Instruction::from_char(c).map(|i| (i, offset)))
            .unzip();
        Self { instructions, offsets }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Character offset in the original source of the instruction at `index`.
    pub fn source_offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }
}

impl fmt::Display for Program {
    /// Renders the filtered program, comments stripped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_whitespace_are_dropped() {
        let program = Program::parse("add two: ++ \n then print .  (done)");
        assert_eq!(program.to_string(), "++.");
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn offsets_point_back_into_source() {
        let program = Program::parse("a+b[c]");
        assert_eq!(program.source_offset(0), Some(1));
        assert_eq!(program.source_offset(1), Some(3));
        assert_eq!(program.source_offset(2), Some(5));
        assert_eq!(program.source_offset(3), None);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let program = Program::parse("é+");
        assert_eq!(program.source_offset(0), Some(1));
    }

    #[test]
    fn every_symbol_round_trips_through_char() {
        for c in "><+-.,[]".chars() {
            let instr = Instruction::from_char(c).expect("instruction character");
            assert_eq!(instr.symbol(), c);
        }
        assert_eq!(Instruction::from_char('x'), None);
    }

    #[test]
    fn empty_source_is_empty_program() {
        assert!(Program::parse("no instructions here").is_empty());
    }
}
