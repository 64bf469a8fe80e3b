use clap::Args;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli_util::print_error;
use crate::config::Settings;
use crate::engine::{Engine, StepLimit};
use crate::program::Program;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Brainfuck program file to execute
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Load `args.file`, run it against stdin/stdout, and return the exit status.
pub fn run(program: &str, args: RunArgs, settings: &Settings) -> i32 {
    let Some(path) = args.file else {
        usage_and_exit(program, 2);
    };

    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{program}: failed to read {}: {e}", path.display());
            let _ = io::stderr().flush();
            return 1;
        }
    };
    // Comments may hold any bytes; only the instruction characters matter.
    let source = String::from_utf8_lossy(&bytes);
    let parsed = Program::parse(&source);
    tracing::info!(file = %path.display(), instructions = parsed.len(), "program loaded");

    let mut engine = match Engine::with_tape_len(parsed.clone(), io::stdin(), io::stdout(), settings.tape_len) {
        Ok(engine) => engine,
        Err(err) => {
            print_error(Some(program), &source, &parsed, &err, &settings.colors);
            return 1;
        }
    };

    let limit = settings.max_steps.map(StepLimit::new);
    let result = match (settings.debug, limit) {
        (true, Some(limit)) => engine.run_debug_with_limit(&mut io::stdout(), limit),
        (true, None) => engine.run_debug(&mut io::stdout()),
        (false, Some(limit)) => engine.run_with_limit(limit),
        (false, None) => engine.run(),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_error(Some(program), &source, &parsed, &err, &settings.colors);
            1
        }
    }
}

pub fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} <FILE>    # Run the Brainfuck program stored in FILE

Options:
  --help,    -h   Show this help
  --version, -V   Show the version

Notes:
- Only the characters ><+-.,[] are instructions; everything else is a comment.
- Input (`,`) reads one byte from stdin. On end of input, or on byte 26,
  the current cell is left unchanged.
- The tape holds 30,000 cells; moving the pointer off either end is an error.

Environment:
  BRAINFRY_MAX_STEPS=<N>   Abort after N instructions (default unlimited)
  BRAINFRY_TAPE_LEN=<N>    Tape length in cells (default 30000)
  BRAINFRY_DEBUG=1         Print a step-by-step table instead of running I/O
  BRAINFRY_LOG=<FILTER>    Log filter for diagnostics on stderr (default warn)

Settings can also be placed in brainfry.toml in the user config directory.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
