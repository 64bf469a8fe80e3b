//! A small Brainfuck interpreter.
//!
//! Programs run on a fixed tape of 30,000 byte cells with a single data
//! pointer. Source text is filtered down to the eight instructions
//! `><+-.,[]`; everything else is a comment. Loops are resolved once before
//! execution, so unbalanced brackets are reported before any I/O happens.
//!
//! Quick start:
//!
//! ```
//! use std::io;
//!
//! let out = brainfry::run("++++++++[>++++++++<-]>+.", io::empty(), Vec::new())
//!     .expect("program should run");
//! assert_eq!(out, b"A");
//! ```
//!
//! For finer control (custom tape length, step limits, debug tables,
//! inspecting the tape afterwards) build an [`Engine`] directly.

use std::io::{Read, Write};

pub mod brackets;
pub mod cli_util;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod program;
pub mod theme;

pub use brackets::JumpMap;
pub use engine::{EOF_SENTINEL, Engine, StepLimit, TAPE_LEN};
pub use error::{BracketKind, BrainfryError, PointerFault};
pub use program::{Instruction, Program};

/// Filter, resolve and run `source` to completion, returning the output sink.
pub fn run<R: Read, W: Write>(source: &str, input: R, output: W) -> Result<W, BrainfryError> {
    let mut engine = Engine::new(Program::parse(source), input, output)?;
    engine.run()?;
    Ok(engine.into_output())
}
