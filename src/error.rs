//! VM-level errors.
//!
//! Saturating time arithmetic, branch fallthrough on a null operand, and
//! writes to the `zero` register are *not* represented here — they are
//! documented silent behaviors (spec.md §7), not failures. `VmError` is
//! reserved for the two things that actually abort a worker: a malformed
//! schedule, and a platform that fails to initialize.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("worker {worker} encountered unknown opcode {opcode} at pc {pc}")]
    UnknownOpcode { worker: usize, opcode: u8, pc: usize },

    #[error("register index {index} out of range (file has {len} registers)")]
    RegisterOutOfRange { index: usize, len: usize },

    #[error("program counter {pc} out of range (schedule has {len} instructions)")]
    PcOutOfRange { pc: usize, len: usize },

    #[error("reaction id {id} out of range ({len} reactions registered)")]
    ReactionOutOfRange { id: usize, len: usize },

    #[error("malformed operand decoding instruction at pc {pc}: {reason}")]
    MalformedOperand { pc: usize, reason: String },

    #[error("platform initialization failed: {0}")]
    PlatformInit(String),
}

pub type VmResult<T> = Result<T, VmError>;
