//! PRET-VM: a static, time-triggered scheduler virtual machine.
//!
//! A schedule compiler emits, per worker thread, a flat array of
//! [`instruction::Instruction`]s referencing a shared [`register::RegisterFile`].
//! At runtime each worker independently fetches, decodes, and executes its
//! own array against that shared state; [`vm::VirtualMachine`] is the
//! harness that owns the register file, the [`reaction::ReactionTable`], one
//! [`schedule::Schedule`] per worker, and the [`platform::Platform`]
//! implementation backing the clock and sleep primitives the `DU` opcode
//! needs.
//!
//! ```
//! use std::sync::Arc;
//! use pretvm::instruction::Instruction;
//! use pretvm::platform::StdPlatform;
//! use pretvm::reaction::ReactionTable;
//! use pretvm::schedule::Schedule;
//! use pretvm::config::VmConfig;
//! use pretvm::vm::VirtualMachine;
//!
//! let schedule = Schedule::new(vec![
//!     Instruction::Addi { dst: 1, src: 0, imm: 5 },
//!     Instruction::Addi { dst: 2, src: 0, imm: 7 },
//!     Instruction::Add { dst: 3, src1: 1, src2: 2 },
//!     Instruction::Stp,
//! ]);
//!
//! let vm = VirtualMachine::new(
//!     Arc::new(StdPlatform::new()),
//!     VmConfig::default(),
//!     8,
//!     ReactionTable::new(),
//!     vec![schedule],
//! ).expect("schedule references only in-range registers and reactions");
//!
//! vm.run().expect("no worker hit an unknown opcode or out-of-range pc");
//! assert_eq!(vm.registers().read(3), 12);
//! ```

pub mod config;
pub mod error;
pub mod instruction;
pub mod platform;
pub mod reaction;
pub mod register;
pub mod schedule;
pub mod tag;
pub mod time;
pub mod vm;
pub mod wire;

pub use error::{VmError, VmResult};
pub use vm::VirtualMachine;
