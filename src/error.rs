use std::fmt;

/// Errors that abort a Brainfuck run.
///
/// Every variant carries the instruction index (`ip`) into the filtered
/// instruction sequence so callers can point back at the offending symbol.
#[derive(Debug, thiserror::Error)]
pub enum BrainfryError {
    /// Loops were not balanced.
    #[error("unbalanced brackets: excess {kind} at instruction {ip}")]
    UnbalancedBrackets { ip: usize, kind: BracketKind },

    /// The data pointer attempted to move left of cell 0 or past the last cell.
    #[error("pointer {fault} at instruction {ip} (ptr={ptr})")]
    PointerOutOfRange {
        ip: usize,
        ptr: usize,
        fault: PointerFault,
    },

    /// The injected input source or output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// A step limit was in force and the program ran past it.
    #[error("step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },
}

impl BrainfryError {
    /// Instruction index the error points at, if it has one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            BrainfryError::UnbalancedBrackets { ip, .. }
            | BrainfryError::PointerOutOfRange { ip, .. }
            | BrainfryError::Io { ip, .. } => Some(*ip),
            BrainfryError::StepLimitExceeded { .. } => None,
        }
    }
}

/// Which side of a loop was left unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    /// A `[` with no closing partner.
    ExcessOpen,
    /// A `]` with no opening partner.
    ExcessClose,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::ExcessOpen => write!(f, "open"),
            BracketKind::ExcessClose => write!(f, "close"),
        }
    }
}

/// Direction in which the data pointer left the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerFault {
    Underflow,
    Overflow,
}

impl fmt::Display for PointerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerFault::Underflow => write!(f, "underflow"),
            PointerFault::Overflow => write!(f, "overflow"),
        }
    }
}
