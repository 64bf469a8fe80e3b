//! Loop bracket resolution.

use crate::error::{BracketKind, BrainfryError};
use crate::program::Instruction;

/// Matching positions of every `[` and `]` in a program.
///
/// `slots[i]` holds the partner index when instruction `i` is a bracket and
/// is `None` otherwise, so lookups are a plain index instead of a hash probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpMap {
    slots: Vec<Option<usize>>,
    loops: usize,
}

impl JumpMap {
    /// Pair up brackets with a stack of unmatched `[` indices.
    ///
    /// Fails on the first `]` without an open partner, or, after the scan, on
    /// any `[` left open (reported at the innermost one).
    pub fn resolve(instructions: &[Instruction]) -> Result<Self, BrainfryError> {
        let mut slots = vec![None; instructions.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut loops = 0;

        for (i, instr) in instructions.iter().enumerate() {
            match instr {
                Instruction::LoopStart => stack.push(i),
                Instruction::LoopEnd => {
                    let Some(open_index) = stack.pop() else {
                        return Err(BrainfryError::UnbalancedBrackets {
                            ip: i,
                            kind: BracketKind::ExcessClose,
                        });
                    };
                    slots[open_index] = Some(i);
                    slots[i] = Some(open_index);
                    loops += 1;
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(BrainfryError::UnbalancedBrackets {
                ip: unmatched_open,
                kind: BracketKind::ExcessOpen,
            });
        }

        tracing::debug!(instructions = instructions.len(), loops, "brackets resolved");
        Ok(Self { slots, loops })
    }

    /// Index of the bracket matching the one at `index`.
    pub fn partner(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    /// Number of slots, equal to the program length.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of matched `[`/`]` pairs.
    pub fn loop_count(&self) -> usize {
        self.loops
    }
}
