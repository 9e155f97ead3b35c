//! Interrupt-safe guard bracketing every hardware access.
//!
//! Maintenance must not interleave with a context switch or a second core's
//! maintenance on the same cache, so each hardware window runs under a lock
//! that is safe to take from interrupt context. On hardware that lock is
//! [`CriticalSectionRawMutex`]; host tests substitute an instrumented lock
//! that records the window boundaries.

use embassy_sync::blocking_mutex::raw::RawMutex;

pub use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

/// A lock the maintenance operation may take from any context, including
/// interrupt handlers.
///
/// Implementations must be bounded (no spinning on a peer that may never
/// release) and must not suspend the caller. The operation holds the lock
/// only across register-level work and never nests acquisitions, so
/// reentrancy support is not required.
pub trait IsrLock {
    /// Run `f` with the lock held.
    fn with<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// Every embassy raw mutex qualifies: `CriticalSectionRawMutex` for
/// hardware, `NoopRawMutex` where the caller already runs with interrupts
/// masked.
impl<M: RawMutex> IsrLock for M {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        self.lock(f)
    }
}
