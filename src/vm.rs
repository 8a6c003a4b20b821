//! Per-worker fetch-decode-execute dispatch loop and the shared VM state
//! (register file, reaction table, one [`Schedule`] per worker) the twelve
//! opcodes execute against.
//!
//! This is the `VirtualMachine`/`WorkerContext` re-expression of the
//! original's module-level globals (spec.md §9's first design note): the
//! register file, reaction table, and schedules live as fields here,
//! shared across worker threads by reference instead of as free-standing
//! statics.

use std::sync::Arc;
use std::thread;

use tracing::{debug, trace, warn};

use crate::config::VmConfig;
use crate::error::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::platform::Platform;
use crate::reaction::{ReactionId, ReactionTable};
use crate::register::{RegisterFile, ZERO_REGISTER};
use crate::schedule::Schedule;
use crate::time::{self, Instant, Interval};

/// Busy-spin iterations `WU`/`WLT` and `DU`'s short-wait path attempt
/// before yielding the thread, bounding pure CPU burn on a long-blocked
/// rendezvous (spec.md §9: "a production implementation should add a
/// backoff schedule").
const SPIN_ITERATIONS: u32 = 1_000;

/// A fully wired VM: shared register file, reaction table, one [`Schedule`]
/// per worker, and the [`Platform`] backing clock/sleep/core-count queries.
///
/// Built once via [`VirtualMachine::new`], which validates every register
/// and reaction index every schedule references before any worker runs —
/// spec.md §7's "programming error in the schedule" category is caught at
/// construction, not mid-dispatch.
pub struct VirtualMachine<P: Platform> {
    platform: Arc<P>,
    config: VmConfig,
    registers: RegisterFile,
    reactions: ReactionTable,
    schedules: Vec<Schedule>,
}

impl<P: Platform> VirtualMachine<P> {
    /// Allocate the register file and validate every schedule against it
    /// and against `reactions` before returning.
    pub fn new(
        platform: Arc<P>,
        config: VmConfig,
        register_count: usize,
        reactions: ReactionTable,
        schedules: Vec<Schedule>,
    ) -> VmResult<Self> {
        let registers = RegisterFile::new(register_count);
        for schedule in &schedules {
            for instr in schedule.iter() {
                for reg in instr.referenced_registers() {
                    if reg >= registers.len() {
                        return Err(VmError::RegisterOutOfRange { index: reg, len: registers.len() });
                    }
                }
                if let Some(id) = instr.referenced_reaction() {
                    if id.0 >= reactions.len() {
                        return Err(VmError::ReactionOutOfRange { id: id.0, len: reactions.len() });
                    }
                }
            }
        }

        Ok(Self {
            platform,
            config,
            registers,
            reactions,
            schedules,
        })
    }

    /// The shared register file, for inspecting final state after [`run`](Self::run)
    /// returns (tests do this; a live application normally only cares about
    /// reaction side effects).
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn worker_count(&self) -> usize {
        self.schedules.len()
    }

    /// Spawn one OS thread per worker schedule (named `pretvm-worker-{n}`,
    /// per SPEC_FULL.md §5), run each dispatch loop to completion, and join
    /// all of them. Returns the first error any worker encountered, if any.
    ///
    /// A thread-create failure is a platform failure (spec.md §7 names it
    /// explicitly) and is surfaced as [`VmError::PlatformInit`] rather than
    /// panicking; a worker thread panicking during dispatch is re-raised by
    /// resuming its unwind, matching how a panic inside any other library
    /// call would propagate to the caller.
    pub fn run(&self) -> VmResult<()> {
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.schedules.len());
            for (worker, schedule) in self.schedules.iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("pretvm-worker-{worker}"))
                    .spawn_scoped(scope, move || self.run_worker(worker, schedule))
                    .map_err(|e| VmError::PlatformInit(format!("failed to spawn worker {worker}: {e}")))?;
                handles.push(handle);
            }

            let mut first_err = None;
            for handle in handles {
                match handle.join() {
                    Ok(Err(e)) if first_err.is_none() => first_err = Some(e),
                    Ok(_) => {}
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            match first_err {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }

    /// Run a single worker's dispatch loop in the calling thread, without
    /// spawning — used by scenario tests that only need one worker and
    /// want to assert on its terminal PC without standing up [`run`](Self::run)'s
    /// thread pool.
    pub fn run_worker_inline(&self, worker: usize) -> VmResult<usize> {
        let schedule = &self.schedules[worker];
        let mut pc = 0usize;
        let mut exit_loop = false;
        let mut returned_reaction: Option<ReactionId> = None;

        while !exit_loop {
            let instr = *schedule
                .get(pc)
                .ok_or(VmError::PcOutOfRange { pc, len: schedule.len() })?;
            self.execute(worker, instr, &mut pc, &mut exit_loop, &mut returned_reaction);
        }
        Ok(pc)
    }

    fn run_worker(&self, worker: usize, schedule: &Schedule) -> VmResult<()> {
        debug!(worker, "worker starting");
        let mut pc: usize = 0;
        let mut exit_loop = false;
        let mut returned_reaction: Option<ReactionId> = None;

        // spec.md §4.4: there is no VM-level global stop broadcast. A
        // worker exits only when its own schedule executes STP; siblings
        // that haven't reached their own STP yet keep dispatching.
        while !exit_loop {
            let instr = *schedule
                .get(pc)
                .ok_or(VmError::PcOutOfRange { pc, len: schedule.len() })?;

            #[cfg(feature = "trace-instructions")]
            trace!(worker, pc, ?instr, "dispatch");

            self.execute(worker, instr, &mut pc, &mut exit_loop, &mut returned_reaction);
        }

        debug!(worker, "worker stopped");
        Ok(())
    }

    fn execute(
        &self,
        worker: usize,
        instr: Instruction,
        pc: &mut usize,
        exit_loop: &mut bool,
        _returned_reaction: &mut Option<ReactionId>,
    ) {
        match instr {
            Instruction::Add { dst, src1, src2 } => {
                let result = self.registers.read(src1).wrapping_add(self.registers.read(src2));
                self.registers.write(dst, result);
                *pc += 1;
            }
            Instruction::Addi { dst, src, imm } => {
                let result = self.registers.read(src).wrapping_add(imm as u64);
                self.registers.write(dst, result);
                *pc += 1;
            }
            Instruction::Beq { op1, op2, target } => self.branch(pc, op1, op2, target, |a, b| a == b),
            Instruction::Bne { op1, op2, target } => self.branch(pc, op1, op2, target, |a, b| a != b),
            Instruction::Blt { op1, op2, target } => {
                self.branch(pc, op1, op2, target, |a, b| (a as i64) < (b as i64))
            }
            Instruction::Bge { op1, op2, target } => {
                self.branch(pc, op1, op2, target, |a, b| (a as i64) >= (b as i64))
            }
            Instruction::Du { base, offset } => {
                self.exec_du(worker, base, offset);
                *pc += 1;
            }
            Instruction::Exe { reaction, args } => {
                let arg = self.registers.read(args);
                trace!(worker, reaction = reaction.0, "invoking reaction");
                self.reactions.call(reaction, arg);
                *pc += 1;
            }
            Instruction::Wlt { var, bound } => {
                self.spin_wait(var, |v| v >= bound);
                *pc += 1;
            }
            Instruction::Wu { var, bound } => {
                self.spin_wait(var, |v| v < bound);
                *pc += 1;
            }
            Instruction::Jal { dst, label, offset } => {
                if dst != ZERO_REGISTER {
                    self.registers.write(dst, (*pc + 1) as u64);
                }
                *pc = (label as i64 + offset) as usize;
            }
            Instruction::Jalr { dst, base, offset } => {
                if dst != ZERO_REGISTER {
                    self.registers.write(dst, (*pc + 1) as u64);
                }
                *pc = (self.registers.read(base) as i64 + offset) as usize;
            }
            Instruction::Stp => {
                *exit_loop = true;
            }
        }
    }

    /// Shared predicate-evaluation for the four branch opcodes. A `None`
    /// operand (the compiler eliding an unused branch register) makes the
    /// predicate false, per spec.md §4.3.
    fn branch(
        &self,
        pc: &mut usize,
        op1: Option<usize>,
        op2: Option<usize>,
        target: usize,
        predicate: impl Fn(u64, u64) -> bool,
    ) {
        let taken = match (op1, op2) {
            (Some(a), Some(b)) => predicate(self.registers.read(a), self.registers.read(b)),
            _ => false,
        };
        *pc = if taken { target } else { *pc + 1 };
    }

    /// `wakeup = *base + offset`; spin below [`VmConfig::spin_wait_threshold`]
    /// of the deadline, otherwise hand off to [`Platform::sleep_until`] and
    /// re-check on spurious early return.
    fn exec_du(&self, worker: usize, base: usize, offset: Interval) {
        let wakeup = time::add(self.registers.read(base) as Instant, offset);
        loop {
            let remaining = wakeup - self.platform.now();
            if remaining <= 0 {
                return;
            }
            if remaining < self.config.spin_wait_threshold {
                std::hint::spin_loop();
                continue;
            }
            self.platform.sleep_until(wakeup);
            if self.platform.now() < wakeup {
                warn!(worker, "sleep_until returned before its deadline, rechecking");
            }
        }
    }

    /// Busy-spin, with backoff, while `blocked(*var)` holds. Used by both
    /// `WLT` (blocked while `>= bound`) and `WU` (blocked while `< bound`).
    fn spin_wait(&self, var: usize, blocked: impl Fn(i64) -> bool) {
        let mut spins = 0u32;
        while blocked(self.registers.read(var) as i64) {
            if spins < SPIN_ITERATIONS {
                std::hint::spin_loop();
                spins += 1;
            } else {
                std::thread::yield_now();
            }
        }
    }
}
