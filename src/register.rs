//! The shared register file: an ordered sequence of 64-bit words visible to
//! every worker.

use std::sync::atomic::{AtomicU64, Ordering};

/// Index of the distinguished read-only `zero` register. Writes to it are
/// silently discarded; reads always yield `0`.
pub const ZERO_REGISTER: usize = 0;

/// The shared register file.
///
/// Every register is backed by an [`AtomicU64`] — even registers the
/// schedule assigns a single writer still need atomic access, because
/// other workers read them across threads without any lock. Reads use
/// `Acquire` and writes use `Release`, which is sufficient for the
/// monotonic-counter rendezvous pattern (`WU`/`WLT` spinning on a register
/// another worker increments) and costs nothing extra for the
/// single-writer general-purpose case.
#[derive(Debug)]
pub struct RegisterFile {
    registers: Vec<AtomicU64>,
}

impl RegisterFile {
    /// Create a register file with `len` registers, all initialized to 0.
    /// Register 0 is the `zero` register.
    pub fn new(len: usize) -> Self {
        let mut registers = Vec::with_capacity(len);
        registers.resize_with(len, || AtomicU64::new(0));
        Self { registers }
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Read register `index`. Panics if `index` is out of range — a
    /// compiler-emitted schedule referencing an out-of-range register is a
    /// programming error that [`crate::VirtualMachine::new`] rejects before
    /// any worker runs.
    pub fn read(&self, index: usize) -> u64 {
        self.registers[index].load(Ordering::Acquire)
    }

    /// Write `value` into register `index`. A write to [`ZERO_REGISTER`] is
    /// a documented no-op, not an error.
    pub fn write(&self, index: usize, value: u64) {
        if index == ZERO_REGISTER {
            return;
        }
        self.registers[index].store(value, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_reads_zero() {
        let regs = RegisterFile::new(4);
        assert_eq!(regs.read(ZERO_REGISTER), 0);
    }

    #[test]
    fn writes_to_zero_are_ignored() {
        let regs = RegisterFile::new(4);
        regs.write(ZERO_REGISTER, 42);
        assert_eq!(regs.read(ZERO_REGISTER), 0);
    }

    #[test]
    fn addi_zero_zero_k_leaves_zero_at_zero() {
        // ADDI(zero, zero, k) computes zero + k then writes to zero, a no-op.
        let regs = RegisterFile::new(4);
        let result = regs.read(ZERO_REGISTER).wrapping_add(7);
        regs.write(ZERO_REGISTER, result);
        assert_eq!(regs.read(ZERO_REGISTER), 0);
    }

    #[test]
    fn ordinary_registers_roundtrip() {
        let regs = RegisterFile::new(4);
        regs.write(1, 99);
        assert_eq!(regs.read(1), 99);
    }
}
