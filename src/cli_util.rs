use std::io::{self, IsTerminal, Write};

use crate::error::BrainfryError;
use crate::program::Program;
use crate::theme::Colors;

/// Characters of source shown on either side of the caret.
const WINDOW_CHARS: usize = 32;

/// Category label shown before an error message.
pub fn error_label(err: &BrainfryError) -> &'static str {
    match err {
        BrainfryError::UnbalancedBrackets { .. } => "Parse error",
        BrainfryError::PointerOutOfRange { .. } => "Runtime error",
        BrainfryError::Io { .. } => "I/O error",
        BrainfryError::StepLimitExceeded { .. } => "Execution aborted",
    }
}

/// Render an error as `program: Label: message`, followed by the source
/// window with a caret under the offending instruction when it has one.
///
/// `colors` is `None` for plain output (pipes, files, tests).
pub fn render_error(
    program_name: Option<&str>,
    source: &str,
    program: &Program,
    err: &BrainfryError,
    colors: Option<&Colors>,
) -> String {
    let label = error_label(err);
    let label = match colors {
        Some(c) => c.error_style().paint(label).to_string(),
        None => label.to_string(),
    };
    let prefix = match (program_name, colors) {
        (Some(p), Some(c)) => format!("{}: ", c.program_style().paint(p)),
        (Some(p), None) => format!("{p}: "),
        (None, _) => String::new(),
    };

    let mut out = format!("{prefix}{label}: {err}\n");
    if let Some(offset) = err.ip().and_then(|ip| program.source_offset(ip)) {
        let (window, caret_col) = context_window(source, offset);
        let caret = match colors {
            Some(c) => c.caret_style().paint("^").to_string(),
            None => "^".to_string(),
        };
        out.push_str(&format!("  {window}\n"));
        out.push_str(&format!("  {}{caret}\n", " ".repeat(caret_col)));
    }
    out
}

/// Write a rendered error to stderr, colored when stderr is a terminal.
pub fn print_error(
    program_name: Option<&str>,
    source: &str,
    program: &Program,
    err: &BrainfryError,
    colors: &Colors,
) {
    let stderr = io::stderr();
    let colors = stderr.is_terminal().then_some(colors);
    let rendered = render_error(program_name, source, program, err, colors);
    let mut handle = stderr.lock();
    let _ = handle.write_all(rendered.as_bytes());
    let _ = handle.flush();
}

/// The single line of `source` around char offset `pos`, clipped to
/// [`WINDOW_CHARS`] on each side, and the caret column within it.
fn context_window(source: &str, pos: usize) -> (String, usize) {
    let chars: Vec<char> = source.chars().collect();
    let pos = pos.min(chars.len().saturating_sub(1));

    let line_start = chars[..pos]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |i| i + 1);
    let line_end = chars[pos..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |i| pos + i);

    let start = pos.saturating_sub(WINDOW_CHARS).max(line_start);
    let end = (pos + WINDOW_CHARS + 1).min(line_end);

    // Tabs would throw the caret off.
    let window: String = chars[start..end]
        .iter()
        .map(|&c| if c == '\t' { ' ' } else { c })
        .collect();
    (window, pos - start)
}
