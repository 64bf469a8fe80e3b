//! The execution engine.
//!
//! Features and behaviors:
//! - A fixed tape (30,000 cells by default) initialized to 0.
//! - Strict pointer bounds: moving left from cell 0 or right past the last
//!   cell aborts the run.
//! - Cell arithmetic wraps modulo 256.
//! - `,` reads one byte from the injected input. End-of-input leaves the
//!   current cell untouched, and so does the byte [`EOF_SENTINEL`].
//! - `.` writes the current cell as one raw byte to the injected output.

use std::io::{self, Read, Write};

use crate::brackets::JumpMap;
use crate::error::{BracketKind, BrainfryError, PointerFault};
use crate::program::{Instruction, Program};

/// Default number of cells on the tape.
pub const TAPE_LEN: usize = 30_000;

/// Input byte treated like end-of-input (the old DOS Ctrl+Z end-of-file mark).
///
/// Reading it through `,` leaves the current cell unchanged. This is a
/// compatibility rule: programs that test for 26 as "no more input" keep
/// working, at the cost of never being able to read a literal 26.
pub const EOF_SENTINEL: u8 = 26;

/// Caps the number of instructions a run may execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimit {
    pub max_steps: usize,
}

impl StepLimit {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

/// Interpreter state for a single program run.
///
/// The engine owns:
/// - the filtered program and its resolved [`JumpMap`],
/// - the tape, data pointer and program counter,
/// - an input source and output sink (any `Read` / `Write`).
///
/// Engines never share state; run several programs with several engines.
pub struct Engine<R, W> {
    program: Program,
    jumps: JumpMap,
    tape: Vec<u8>,
    pointer: usize,
    pc: usize,
    steps: usize,
    input: R,
    output: W,
}

impl<R: Read, W: Write> Engine<R, W> {
    /// Build an engine with a [`TAPE_LEN`] tape, resolving brackets up front.
    pub fn new(program: Program, input: R, output: W) -> Result<Self, BrainfryError> {
        Self::with_tape_len(program, input, output, TAPE_LEN)
    }

    /// Build an engine with a custom tape length (at least one cell).
    pub fn with_tape_len(
        program: Program,
        input: R,
        output: W,
        tape_len: usize,
    ) -> Result<Self, BrainfryError> {
        let jumps = JumpMap::resolve(program.instructions())?;
        Ok(Self {
            program,
            jumps,
            tape: vec![0; tape_len.max(1)],
            pointer: 0,
            pc: 0,
            steps: 0,
            input,
            output,
        })
    }

    /// Execute the program until the program counter runs off the end.
    pub fn run(&mut self) -> Result<(), BrainfryError> {
        self.execute(None, None)
    }

    /// Like [`run`](Self::run), but abort once `limit.max_steps` instructions
    /// have executed.
    pub fn run_with_limit(&mut self, limit: StepLimit) -> Result<(), BrainfryError> {
        self.execute(None, Some(limit))
    }

    /// Run while writing a step-by-step table of operations to `trace`.
    ///
    /// Tape and pointer advance exactly as in a real run, but `.` writes
    /// nothing and `,` behaves as end-of-input.
    pub fn run_debug<T: Write>(&mut self, trace: &mut T) -> Result<(), BrainfryError> {
        self.execute(Some(trace as &mut dyn Write), None)
    }

    /// Debug run with a step limit.
    pub fn run_debug_with_limit<T: Write>(
        &mut self,
        trace: &mut T,
        limit: StepLimit,
    ) -> Result<(), BrainfryError> {
        self.execute(Some(trace as &mut dyn Write), Some(limit))
    }

    fn execute(
        &mut self,
        trace: Option<&mut dyn Write>,
        limit: Option<StepLimit>,
    ) -> Result<(), BrainfryError> {
        let result = self.step_loop(trace, limit);
        let flushed = self.output.flush();

        tracing::debug!(
            steps = self.steps,
            pointer = self.pointer,
            ok = result.is_ok(),
            "run finished"
        );

        match (result, flushed) {
            (Err(err), _) => Err(err),
            (Ok(()), Err(source)) => Err(BrainfryError::Io { ip: self.pc, source }),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn step_loop(
        &mut self,
        mut trace: Option<&mut dyn Write>,
        limit: Option<StepLimit>,
    ) -> Result<(), BrainfryError> {
        if let Some(out) = trace.as_mut() {
            writeln!(out, "STEP | IP  | PTR | CELL | INSTR | ACTION")
                .and_then(|_| {
                    writeln!(
                        out,
                        "-----+-----+-----+------+-------+------------------------------------------------"
                    )
                })
                .map_err(|source| BrainfryError::Io { ip: self.pc, source })?;
        }

        while self.pc < self.program.len() {
            if let Some(limit) = limit {
                if self.steps >= limit.max_steps {
                    return Err(BrainfryError::StepLimitExceeded { limit: limit.max_steps });
                }
            }

            let ip = self.pc;
            let instr = self.program.instructions()[ip];
            let (ptr_before, cell_before) = (self.pointer, self.tape[self.pointer]);
            let mut action: Option<String> = trace.as_ref().map(|_| String::new());
            let mut next = ip + 1;

            match instr {
                Instruction::Right => {
                    if self.pointer >= self.tape.len() - 1 {
                        return Err(BrainfryError::PointerOutOfRange {
                            ip,
                            ptr: self.pointer,
                            fault: PointerFault::Overflow,
                        });
                    }
                    self.pointer += 1;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                Instruction::Left => {
                    if self.pointer == 0 {
                        return Err(BrainfryError::PointerOutOfRange {
                            ip,
                            ptr: self.pointer,
                            fault: PointerFault::Underflow,
                        });
                    }
                    self.pointer -= 1;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                Instruction::Inc => {
                    let after = cell_before.wrapping_add(1);
                    self.tape[self.pointer] = after;
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                Instruction::Dec => {
                    let after = cell_before.wrapping_sub(1);
                    self.tape[self.pointer] = after;
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                Instruction::Output => {
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output byte {cell_before} (suppressed in debug)");
                    } else {
                        self.output
                            .write_all(&[cell_before])
                            .map_err(|source| BrainfryError::Io { ip, source })?;
                    }
                }
                Instruction::Input => {
                    if let Some(a) = action.as_mut() {
                        *a = "Read byte -> simulated end of input (cell unchanged)".to_string();
                    } else if let Some(byte) = self.read_byte(ip)? {
                        if byte != EOF_SENTINEL {
                            self.tape[self.pointer] = byte;
                        }
                    }
                }
                Instruction::LoopStart => {
                    if cell_before == 0 {
                        let j = self.jump_target(ip)?;
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; jump forward past matching ']' at IP {j}"); }
                        next = j + 1;
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                Instruction::LoopEnd => {
                    // Land on the matching '[' so it re-tests the cell.
                    let j = self.jump_target(ip)?;
                    if let Some(a) = action.as_mut() { *a = format!("Jump back to matching '[' at IP {j}"); }
                    next = j;
                }
            }

            if let Some(out) = trace.as_mut() {
                writeln!(
                    out,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    self.steps,
                    ip,
                    ptr_before,
                    cell_before,
                    instr,
                    action.unwrap_or_default()
                )
                .map_err(|source| BrainfryError::Io { ip, source })?;
            }

            self.steps += 1;
            self.pc = next;
        }

        Ok(())
    }

    /// Read one byte from the input, flushing pending output first so prompts
    /// show up before the program blocks. `None` means end-of-input.
    fn read_byte(&mut self, ip: usize) -> Result<Option<u8>, BrainfryError> {
        self.output
            .flush()
            .map_err(|source| BrainfryError::Io { ip, source })?;

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(BrainfryError::Io { ip, source }),
            }
        }
    }

    /// Partner of the bracket at `ip`. A missing entry is reported as the
    /// bracket being unbalanced.
    fn jump_target(&self, ip: usize) -> Result<usize, BrainfryError> {
        self.jumps.partner(ip).ok_or_else(|| {
            let kind = match self.program.instructions()[ip] {
                Instruction::LoopStart => BracketKind::ExcessOpen,
                _ => BracketKind::ExcessClose,
            };
            BrainfryError::UnbalancedBrackets { ip, kind }
        })
    }
}

impl<R, W> Engine<R, W> {
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.pointer
    }

    pub fn program_counter(&self) -> usize {
        self.pc
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Tear the engine down and hand back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn engine(code: &str, input: &[u8]) -> Engine<Cursor<Vec<u8>>, Vec<u8>> {
        Engine::new(Program::parse(code), Cursor::new(input.to_vec()), Vec::new())
            .expect("program should resolve")
    }

    fn small(code: &str, tape_len: usize) -> Engine<io::Empty, Vec<u8>> {
        Engine::with_tape_len(Program::parse(code), io::empty(), Vec::new(), tape_len)
            .expect("program should resolve")
    }

    #[test]
    fn unmatched_open_bracket_fails_at_construction() {
        let result = Engine::new(Program::parse("[+"), io::empty(), Vec::new());
        assert!(matches!(
            result,
            Err(BrainfryError::UnbalancedBrackets { kind: BracketKind::ExcessOpen, .. })
        ));
    }

    #[test]
    fn missing_jump_entry_is_an_error_not_a_panic() {
        // Pair the program with a map resolved from a different program.
        let mut bf = Engine {
            program: Program::parse("[]"),
            jumps: JumpMap::resolve(&[]).expect("empty"),
            tape: vec![0; 1],
            pointer: 0,
            pc: 0,
            steps: 0,
            input: io::empty(),
            output: Vec::new(),
        };
        let result = bf.run();
        assert!(matches!(
            result,
            Err(BrainfryError::UnbalancedBrackets { ip: 0, kind: BracketKind::ExcessOpen })
        ));
    }

    #[test]
    fn left_pointer_underflow_errors() {
        let mut bf = small("<", 10);
        let result = bf.run();
        assert!(matches!(
            result,
            Err(BrainfryError::PointerOutOfRange { ip: 0, ptr: 0, fault: PointerFault::Underflow })
        ));
    }

    #[test]
    fn right_pointer_overflow_errors() {
        // With 3 cells (0..=2), the 3rd '>' attempts to move beyond index 2.
        let tape_len = 3;
        let mut bf = small(&">".repeat(tape_len), tape_len);
        let result = bf.run();
        assert!(matches!(
            result,
            Err(BrainfryError::PointerOutOfRange { ip: 2, ptr: 2, fault: PointerFault::Overflow })
        ));
        assert_eq!(bf.data_pointer(), 2);
    }

    #[test]
    fn default_tape_boundaries() {
        let mut bf = engine(&">".repeat(TAPE_LEN), b"");
        assert_eq!(bf.tape().len(), TAPE_LEN);
        let result = bf.run();
        assert!(matches!(
            result,
            Err(BrainfryError::PointerOutOfRange { fault: PointerFault::Overflow, .. })
        ));
        assert_eq!(bf.data_pointer(), TAPE_LEN - 1);

        let mut bf = engine(&">".repeat(TAPE_LEN - 1), b"");
        bf.run().expect("last cell is reachable");
        assert_eq!(bf.data_pointer(), 29_999);
    }

    #[test]
    fn empty_loop_on_zero_cell_is_ok() {
        let mut bf = small("[]", 10);
        assert!(bf.run().is_ok());
        assert_eq!(bf.steps(), 1);
    }

    #[test]
    fn zero_cell_skips_loop_body() {
        let mut bf = small("[+>+]+", 10);
        bf.run().expect("runs");
        assert_eq!(&bf.tape()[..2], &[1, 0]);
        assert_eq!(bf.data_pointer(), 0);
    }

    #[test]
    fn single_pass_loop_clears_cell() {
        let mut bf = small("+[-]", 10);
        bf.run().expect("terminates");
        assert_eq!(bf.tape()[0], 0);
        // '+', '[', '-', ']', '[' (exit)
        assert_eq!(bf.steps(), 5);
        assert_eq!(bf.program_counter(), 4);
    }

    #[test]
    fn nested_loops_multiply() {
        let mut bf = small("+++[>++[>+<-]<-]", 3);
        bf.run().expect("runs");
        assert_eq!(bf.tape(), &[0, 0, 6]);
    }

    #[test]
    fn wrapping_subtraction() {
        let mut bf = small("-", 1);
        assert!(bf.run().is_ok());
        assert_eq!(bf.tape()[0], 255);
    }

    #[test]
    fn wrapping_addition() {
        let code = "+".repeat(256); // 256 increments should wrap around
        let mut bf = small(&code, 1);
        assert!(bf.run().is_ok());
        assert_eq!(bf.tape()[0], 0);
    }

    #[test]
    fn output_writes_raw_cell_bytes() {
        let mut bf = engine("++++++++[>++++++++<-]>+.", b"");
        bf.run().expect("runs");
        assert_eq!(bf.into_output(), vec![65]);
    }

    #[test]
    fn output_is_not_utf8_encoded() {
        let mut bf = engine("-.", b"");
        bf.run().expect("runs");
        assert_eq!(bf.output(), &vec![255]);
    }

    #[test]
    fn input_passes_through() {
        let mut bf = engine(",.", b"a");
        bf.run().expect("runs");
        assert_eq!(bf.into_output(), vec![97]);
    }

    #[test]
    fn end_of_input_leaves_cell_unchanged() {
        let mut bf = engine("+++,", b"");
        bf.run().expect("eof is not an error");
        assert_eq!(bf.tape()[0], 3);
    }

    #[test]
    fn eof_sentinel_byte_leaves_cell_unchanged() {
        // Deliberate compatibility rule: byte 26 reads like end-of-input.
        let mut bf = engine("+++,>,", &[EOF_SENTINEL, 7]);
        bf.run().expect("runs");
        assert_eq!(&bf.tape()[..2], &[3, 7]);
    }

    #[test]
    fn echo_until_end_of_input() {
        // Cell is zeroed after each echo so end-of-input leaves a 0 behind.
        let mut bf = engine(",[.[-],]", b"hi!");
        bf.run().expect("runs");
        assert_eq!(bf.into_output(), b"hi!".to_vec());
    }

    #[test]
    fn step_limit_observes_infinite_loop() {
        // The body moves right, bumps cell 1 and moves back; cell 0 stays 1.
        let mut bf = small("+[>+<]", 2);
        let result = bf.run_with_limit(StepLimit::new(500));
        assert!(matches!(result, Err(BrainfryError::StepLimitExceeded { limit: 500 })));
        assert_eq!(bf.steps(), 500);
        assert_eq!(bf.tape()[0], 1);
        assert!(bf.tape()[1] > 50, "loop body should repeat, cell 1 = {}", bf.tape()[1]);
    }

    #[test]
    fn step_limit_not_hit_by_short_program() {
        let mut bf = small("+++", 1);
        bf.run_with_limit(StepLimit::new(3)).expect("exactly three steps");
        assert_eq!(bf.tape()[0], 3);
    }

    #[test]
    fn debug_run_prints_table_and_suppresses_io() {
        let mut bf = engine(">+.,", b"z");
        let mut trace = Vec::new();
        bf.run_debug(&mut trace).expect("runs");
        let trace = String::from_utf8(trace).expect("utf8");
        assert!(trace.starts_with("STEP | IP"));
        assert!(trace.contains("Moved pointer head to index 1"));
        assert!(trace.contains("Increment cell[1] from 0 to 1"));
        assert!(trace.contains("suppressed in debug"));
        assert!(bf.output().is_empty());
        assert_eq!(bf.tape()[1], 1);
    }

    #[test]
    fn comments_are_ignored_during_run() {
        let mut bf = engine("this + is + a + comment .", b"");
        bf.run().expect("runs");
        assert_eq!(bf.into_output(), vec![3]);
    }
}
