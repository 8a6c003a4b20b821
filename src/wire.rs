//! Wire format: the compiler's `Instruction { opcode: u8, op1, op2, op3 }`
//! array, decoded into the typed [`crate::instruction::Instruction`] enum
//! the dispatch loop actually matches on.
//!
//! spec.md §6 describes the schedule binary as a flat `(opcode: u8, op1,
//! op2, op3)` tuple per instruction, with a single tagged 64-bit operand
//! field resolved to either a register index or an immediate by a static,
//! per-opcode operand-role table. [`crate::instruction::Instruction`]
//! already encodes that role table as Rust's own type system (a register
//! field is a `usize`, an immediate is an `i64`, directly) — this module is
//! the boundary that turns the untyped wire tuples a schedule compiler
//! would actually emit into that typed form, and is the one place an
//! [`VmError::UnknownOpcode`] can actually occur: a typed `Instruction` enum
//! match is exhaustive, so decoding raw opcode bytes is the only way an
//! out-of-range opcode value becomes observable at runtime.

use crate::error::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::reaction::ReactionId;

pub mod opcode {
    //! Opcode byte values, in the order spec.md §3 lists them.
    pub const ADD: u8 = 0;
    pub const ADDI: u8 = 1;
    pub const BEQ: u8 = 2;
    pub const BGE: u8 = 3;
    pub const BLT: u8 = 4;
    pub const BNE: u8 = 5;
    pub const DU: u8 = 6;
    pub const EXE: u8 = 7;
    pub const WLT: u8 = 8;
    pub const WU: u8 = 9;
    pub const JAL: u8 = 10;
    pub const JALR: u8 = 11;
    pub const STP: u8 = 12;
}

/// A single wire-format operand: a register reference, an immediate, or
/// absent (the compiler elides operands a given opcode doesn't use, e.g. a
/// branch's unused register when the predicate is statically known false).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(usize),
    Immediate(i64),
    Null,
}

/// One wire-format instruction, exactly as a schedule compiler would emit
/// it: an opcode byte plus three generically-tagged operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction {
    pub opcode: u8,
    pub op1: Operand,
    pub op2: Operand,
    pub op3: Operand,
}

impl RawInstruction {
    pub const fn new(opcode: u8, op1: Operand, op2: Operand, op3: Operand) -> Self {
        Self { opcode, op1, op2, op3 }
    }
}

fn require_register(pc: usize, op: Operand, which: &'static str) -> VmResult<usize> {
    match op {
        Operand::Register(r) => Ok(r),
        other => Err(VmError::MalformedOperand {
            pc,
            reason: format!("{which} expects a register operand, got {other:?}"),
        }),
    }
}

fn require_immediate(pc: usize, op: Operand, which: &'static str) -> VmResult<i64> {
    match op {
        Operand::Immediate(v) => Ok(v),
        other => Err(VmError::MalformedOperand {
            pc,
            reason: format!("{which} expects an immediate operand, got {other:?}"),
        }),
    }
}

fn optional_register(op: Operand) -> Option<usize> {
    match op {
        Operand::Register(r) => Some(r),
        _ => None,
    }
}

/// Decode one wire-format instruction, at position `pc` in `worker`'s
/// schedule (used only to produce a precise [`VmError::UnknownOpcode`] or
/// [`VmError::MalformedOperand`]).
pub fn decode_instruction(worker: usize, pc: usize, raw: RawInstruction) -> VmResult<Instruction> {
    use opcode::*;

    Ok(match raw.opcode {
        ADD => Instruction::Add {
            dst: require_register(pc, raw.op1, "ADD dst")?,
            src1: require_register(pc, raw.op2, "ADD src1")?,
            src2: require_register(pc, raw.op3, "ADD src2")?,
        },
        ADDI => Instruction::Addi {
            dst: require_register(pc, raw.op1, "ADDI dst")?,
            src: require_register(pc, raw.op2, "ADDI src")?,
            imm: require_immediate(pc, raw.op3, "ADDI imm")?,
        },
        BEQ | BGE | BLT | BNE => {
            let op1 = optional_register(raw.op1);
            let op2 = optional_register(raw.op2);
            let target = require_immediate(pc, raw.op3, "branch target")? as usize;
            match raw.opcode {
                BEQ => Instruction::Beq { op1, op2, target },
                BGE => Instruction::Bge { op1, op2, target },
                BLT => Instruction::Blt { op1, op2, target },
                _ => Instruction::Bne { op1, op2, target },
            }
        }
        DU => Instruction::Du {
            base: require_register(pc, raw.op1, "DU base")?,
            offset: require_immediate(pc, raw.op2, "DU offset")?,
        },
        EXE => Instruction::Exe {
            reaction: ReactionId(require_immediate(pc, raw.op1, "EXE reaction id")? as usize),
            args: require_register(pc, raw.op2, "EXE args")?,
        },
        WLT => Instruction::Wlt {
            var: require_register(pc, raw.op1, "WLT var")?,
            bound: require_immediate(pc, raw.op2, "WLT bound")?,
        },
        WU => Instruction::Wu {
            var: require_register(pc, raw.op1, "WU var")?,
            bound: require_immediate(pc, raw.op2, "WU bound")?,
        },
        JAL => Instruction::Jal {
            dst: require_register(pc, raw.op1, "JAL dst")?,
            label: require_immediate(pc, raw.op2, "JAL label")? as usize,
            offset: require_immediate(pc, raw.op3, "JAL offset")?,
        },
        JALR => Instruction::Jalr {
            dst: require_register(pc, raw.op1, "JALR dst")?,
            base: require_register(pc, raw.op2, "JALR base")?,
            offset: require_immediate(pc, raw.op3, "JALR offset")?,
        },
        STP => Instruction::Stp,
        other => return Err(VmError::UnknownOpcode { worker, opcode: other, pc }),
    })
}

/// Decode a whole worker's wire-format instruction stream into a
/// [`crate::schedule::Schedule`].
pub fn decode_schedule(worker: usize, raw: &[RawInstruction]) -> VmResult<crate::schedule::Schedule> {
    let instructions = raw
        .iter()
        .enumerate()
        .map(|(pc, &r)| decode_instruction(worker, pc, r))
        .collect::<VmResult<Vec<_>>>()?;
    Ok(crate::schedule::Schedule::new(instructions))
}
