//! The twelve-opcode instruction set.
//!
//! spec.md models an instruction as `(opcode, op1, op2, op3)`, where each
//! operand is a tagged `register_ref | immediate` union and the tagging is
//! fixed per opcode at compile time, never inspected at runtime. This crate
//! realizes that "fixed per opcode, compile-time" contract directly as a
//! Rust enum with typed fields per variant, instead of carrying three
//! generic tagged operands through dispatch — the enum *is* the static
//! operand-role table, checked by the compiler rather than documented in a
//! comment.

use crate::reaction::ReactionId;
use crate::time::Interval;

/// A single instruction. Each variant documents which of its fields are
/// register indices into the shared register file and which are
/// immediates, matching the per-opcode operand-role table in spec.md §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `*dst = *src1 + *src2` (wrapping `u64` addition). PC += 1.
    Add { dst: usize, src1: usize, src2: usize },

    /// `*dst = *src + imm`. PC += 1.
    Addi { dst: usize, src: usize, imm: i64 },

    /// Branch to `target` if `*op1 == *op2`; fall through (PC += 1)
    /// otherwise. A `None` operand makes the predicate false (the compiler
    /// elides unused branch registers).
    Beq { op1: Option<usize>, op2: Option<usize>, target: usize },

    /// Branch to `target` if `*op1 >= *op2` (signed). See [`Instruction::Beq`].
    Bge { op1: Option<usize>, op2: Option<usize>, target: usize },

    /// Branch to `target` if `*op1 < *op2` (signed). See [`Instruction::Beq`].
    Blt { op1: Option<usize>, op2: Option<usize>, target: usize },

    /// Branch to `target` if `*op1 != *op2`. See [`Instruction::Beq`].
    Bne { op1: Option<usize>, op2: Option<usize>, target: usize },

    /// Delay until `*base + offset` (a physical-time instant). PC += 1
    /// after the wait completes.
    Du { base: usize, offset: Interval },

    /// Synchronously invoke `reaction` with the opaque argument held in
    /// register `args`. PC += 1.
    Exe { reaction: ReactionId, args: usize },

    /// Busy-wait while `*var >= bound` (wait for strictly-less-than). PC += 1.
    Wlt { var: usize, bound: i64 },

    /// Busy-wait while `*var < bound` (wait for at-least). PC += 1.
    Wu { var: usize, bound: i64 },

    /// If `dst` isn't the zero register, `*dst = PC + 1`. Then
    /// `PC = label + offset`.
    Jal { dst: usize, label: usize, offset: i64 },

    /// If `dst` isn't the zero register, `*dst = PC + 1`. Then
    /// `PC = *base + offset`.
    Jalr { dst: usize, base: usize, offset: i64 },

    /// Sets the worker's exit flag. PC is not modified.
    Stp,
}

impl Instruction {
    /// The register indices this instruction reads or writes, for the
    /// bounds-validation pass [`crate::VirtualMachine::new`] runs before any
    /// worker executes.
    pub fn referenced_registers(&self) -> Vec<usize> {
        match *self {
            Instruction::Add { dst, src1, src2 } => vec![dst, src1, src2],
            Instruction::Addi { dst, src, .. } => vec![dst, src],
            Instruction::Beq { op1, op2, .. }
            | Instruction::Bge { op1, op2, .. }
            | Instruction::Blt { op1, op2, .. }
            | Instruction::Bne { op1, op2, .. } => {
                op1.into_iter().chain(op2).collect()
            }
            Instruction::Du { base, .. } => vec![base],
            Instruction::Exe { args, .. } => vec![args],
            Instruction::Wlt { var, .. } | Instruction::Wu { var, .. } => vec![var],
            Instruction::Jal { dst, .. } => vec![dst],
            Instruction::Jalr { dst, base, .. } => vec![dst, base],
            Instruction::Stp => vec![],
        }
    }

    /// The reaction id this instruction calls through, if any.
    pub fn referenced_reaction(&self) -> Option<ReactionId> {
        match *self {
            Instruction::Exe { reaction, .. } => Some(reaction),
            _ => None,
        }
    }
}
