//! Platform abstraction contract.
//!
//! The original scheduler is compiled against a per-target low-level
//! platform API (POSIX, Zephyr, QNX, ...): a monotonic clock, sleep,
//! interruptible sleep-until-deadline, and thread spawn/join. `Platform`
//! collapses that family down to the operations the VM's dispatch loop
//! actually calls — see `original_source/.../lf_qnx_support.h` for the
//! shape this generalizes from. Mutex/Condvar are not part of the trait:
//! they are ordinary `std::sync` types shared behind an `Arc`, not
//! per-platform abstractions, since std already provides them uniformly.

use crate::time::{Instant, Interval};

/// Everything the dispatch loop needs from the underlying OS/hardware.
///
/// `StdPlatform` is the production implementation, backed by
/// `std::time`/`std::thread`. `MockPlatform` (test-only, see `tests/`) is a
/// fast-forwardable clock double for deterministic scenario tests.
pub trait Platform: Send + Sync + 'static {
    /// The current monotonic time, in nanoseconds since some fixed but
    /// otherwise unspecified epoch.
    fn now(&self) -> Instant;

    /// Block the calling thread for at least `duration`. A negative or
    /// zero `duration` returns immediately.
    fn sleep(&self, duration: Interval);

    /// Block the calling thread until `deadline` is reached. Returns
    /// immediately if `deadline` is already in the past.
    fn sleep_until(&self, deadline: Instant);

    /// Number of schedulable cores, used as the default worker count.
    fn num_cores(&self) -> usize;
}

/// The real, OS-backed [`Platform`].
#[derive(Debug, Default)]
pub struct StdPlatform {
    epoch: std::time::Instant,
}

impl StdPlatform {
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

impl Platform for StdPlatform {
    fn now(&self) -> Instant {
        self.epoch.elapsed().as_nanos() as Instant
    }

    fn sleep(&self, duration: Interval) {
        if duration <= 0 {
            return;
        }
        std::thread::sleep(std::time::Duration::from_nanos(duration as u64));
    }

    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline - self.now();
        if remaining > 0 {
            self.sleep(remaining);
        }
    }

    fn num_cores(&self) -> usize {
        num_cpus::get()
    }
}

#[cfg(test)]
pub use mock::MockPlatform;
