//! The maintenance operation: validate, guard, execute.
//!
//! [`CacheSync`] owns the hardware abstraction and the interrupt-safe lock
//! and runs each request as validate → guarded window → done. Validation is
//! complete before the first mutating hardware call, so a rejected request
//! leaves the cache exactly as it was.

use crate::align::is_line_aligned;
use crate::controller::CacheController;
use crate::error::SyncError;
use crate::flags::{Direction, SyncFlags};
use crate::lock::IsrLock;

/// Handle through which all cache maintenance flows.
///
/// One handle per cache. It wraps the target's [`CacheController`] and the
/// lock that serializes maintenance against interrupt handlers; every
/// hardware access happens inside [`IsrLock::with`], so the handle is safe
/// to drive from interrupt context as long as the chosen lock is.
///
/// The operation never allocates, never suspends, and completes in time
/// bounded by the range length.
///
/// # Example
///
/// ```
/// use cache_sync::{CacheController, CacheSync, SyncFlags};
/// use cache_sync::lock::NoopRawMutex;
/// # use soc_caps::CacheCaps;
/// # struct Ctrl;
/// # impl CacheController for Ctrl {
/// #     fn caps(&self) -> CacheCaps { soc_caps::targets::ESP32_S3 }
/// #     fn data_line_size(&self) -> usize { 32 }
/// #     fn is_valid_data_range(&self, _: usize, _: usize) -> bool { true }
/// #     fn writeback(&mut self, _: usize, _: usize) {}
/// #     fn invalidate(&mut self, _: usize, _: usize) {}
/// # }
///
/// // On hardware the lock is CriticalSectionRawMutex; NoopRawMutex suits
/// // callers that already run with interrupts masked.
/// let mut cache = CacheSync::new(Ctrl, NoopRawMutex::new());
/// cache.msync(0x3FC0_0000, 64, SyncFlags::CPU_TO_MEM)?;
/// # Ok::<(), cache_sync::SyncError>(())
/// ```
pub struct CacheSync<C, L> {
    ctrl: C,
    lock: L,
}

impl<C: CacheController, L: IsrLock> CacheSync<C, L> {
    /// Bind a controller to the lock that will guard its maintenance.
    pub const fn new(ctrl: C, lock: L) -> Self {
        Self { ctrl, lock }
    }

    /// Capability descriptor of the underlying cache.
    pub fn caps(&self) -> soc_caps::CacheCaps {
        self.ctrl.caps()
    }

    /// Data-cache line size currently in effect, in bytes.
    ///
    /// Queried under the guard: the configured line size is hardware state
    /// and must not be sampled mid-reconfiguration.
    pub fn data_line_size(&self) -> usize {
        self.lock.with(|| self.ctrl.data_line_size())
    }

    /// Synchronize `[addr, addr + len)` between the CPU cache and memory.
    ///
    /// `flags` names exactly one direction
    /// ([`CPU_TO_MEM`](SyncFlags::CPU_TO_MEM) or
    /// [`MEM_TO_CPU`](SyncFlags::MEM_TO_CPU)) plus optional modifiers. On a
    /// write-through target a `CPU_TO_MEM` request succeeds without
    /// touching hardware — no dirty line can exist, so there is nothing to
    /// flush. Callers wanting the line *gone* rather than merely clean must
    /// use `MEM_TO_CPU` (or
    /// [`INVALIDATE_AFTER_WRITEBACK`](SyncFlags::INVALIDATE_AFTER_WRITEBACK)
    /// on write-back targets) instead of relying on this no-op.
    ///
    /// # Errors
    ///
    /// [`SyncError`] when the request is malformed; see the variant docs
    /// for the individual checks. Errors are reported before any hardware
    /// mutation.
    pub fn msync(&mut self, addr: usize, len: usize, flags: SyncFlags) -> Result<(), SyncError> {
        if addr == 0 {
            return Err(SyncError::NullAddress);
        }
        let direction = flags.direction()?;

        let caps = self.ctrl.caps();
        if direction == Direction::CpuToMem && !caps.writeback_supported {
            return Ok(());
        }

        if addr.checked_add(len).is_none() {
            return Err(SyncError::InvalidRange);
        }
        if !self.ctrl.is_valid_data_range(addr, len) {
            return Err(SyncError::InvalidRange);
        }

        // Writebacks act on whole lines; an unaligned span would also flush
        // strangers' bytes sharing the edge lines, so the caller must opt
        // in. The line size is a hardware register, read under the guard.
        if direction == Direction::CpuToMem && !flags.contains(SyncFlags::ALLOW_UNALIGNED) {
            let line_size = self.lock.with(|| self.ctrl.data_line_size());
            if !is_line_aligned(addr, len, line_size) {
                return Err(SyncError::Misaligned { line_size });
            }
        }

        self.lock.with(|| {
            if caps.freeze_supported {
                self.ctrl.freeze();
            }
            match direction {
                Direction::MemToCpu => self.ctrl.invalidate(addr, len),
                Direction::CpuToMem => {
                    self.ctrl.writeback(addr, len);
                    if flags.contains(SyncFlags::INVALIDATE_AFTER_WRITEBACK) {
                        self.ctrl.invalidate(addr, len);
                    }
                }
            }
            if caps.freeze_supported {
                self.ctrl.unfreeze();
            }
        });

        #[cfg(feature = "defmt")]
        match direction {
            Direction::CpuToMem => defmt::trace!("msync writeback {:#x}+{}", addr, len),
            Direction::MemToCpu => defmt::trace!("msync invalidate {:#x}+{}", addr, len),
        }

        Ok(())
    }

    /// Flush dirty lines in `[addr, addr + len)` to memory.
    ///
    /// Shorthand for [`msync`](Self::msync) with
    /// [`CPU_TO_MEM`](SyncFlags::CPU_TO_MEM); the range must be
    /// line-aligned.
    ///
    /// # Errors
    ///
    /// See [`msync`](Self::msync).
    pub fn writeback(&mut self, addr: usize, len: usize) -> Result<(), SyncError> {
        self.msync(addr, len, SyncFlags::CPU_TO_MEM)
    }

    /// Drop cached copies of `[addr, addr + len)` so the CPU re-reads
    /// memory.
    ///
    /// Shorthand for [`msync`](Self::msync) with
    /// [`MEM_TO_CPU`](SyncFlags::MEM_TO_CPU).
    ///
    /// # Errors
    ///
    /// See [`msync`](Self::msync).
    pub fn invalidate(&mut self, addr: usize, len: usize) -> Result<(), SyncError> {
        self.msync(addr, len, SyncFlags::MEM_TO_CPU)
    }

    /// Flush then drop `[addr, addr + len)`: the line ends up clean in
    /// memory and absent from the cache. Used before handing a buffer to an
    /// agent that will overwrite it.
    ///
    /// # Errors
    ///
    /// See [`msync`](Self::msync).
    pub fn evict(&mut self, addr: usize, len: usize) -> Result<(), SyncError> {
        self.msync(
            addr,
            len,
            SyncFlags::CPU_TO_MEM.union(SyncFlags::INVALIDATE_AFTER_WRITEBACK),
        )
    }

    /// [`writeback`](Self::writeback) over the memory a slice occupies.
    ///
    /// Flush a buffer the CPU has filled before a DMA engine reads it. The
    /// strict alignment rule applies to the slice's address and length;
    /// see [`expand_to_lines`](crate::align::expand_to_lines) for buffers
    /// that are not line-padded.
    ///
    /// # Errors
    ///
    /// See [`msync`](Self::msync).
    pub fn writeback_slice(&mut self, buf: &[u8]) -> Result<(), SyncError> {
        self.writeback(buf.as_ptr() as usize, buf.len())
    }

    /// [`invalidate`](Self::invalidate) over the memory a slice occupies.
    ///
    /// Takes `&mut` because the call changes what subsequent reads of the
    /// slice observe.
    ///
    /// # Errors
    ///
    /// See [`msync`](Self::msync).
    pub fn invalidate_slice(&mut self, buf: &mut [u8]) -> Result<(), SyncError> {
        self.invalidate(buf.as_mut_ptr() as usize, buf.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    //! Validation-order tests with a minimal counting controller. The full
    //! sequencing assertions (guard bracketing, call order) live in the
    //! integration tests driven by `cache-sync-testing`.

    use super::*;
    use crate::lock::NoopRawMutex;
    use soc_caps::CacheCaps;

    struct CountingCtrl {
        caps: CacheCaps,
        line_size: usize,
        range_queries: usize,
        line_queries: usize,
        writebacks: usize,
        invalidates: usize,
        freezes: usize,
        unfreezes: usize,
    }

    impl CountingCtrl {
        fn new(caps: CacheCaps) -> Self {
            Self {
                caps,
                line_size: 32,
                range_queries: 0,
                line_queries: 0,
                writebacks: 0,
                invalidates: 0,
                freezes: 0,
                unfreezes: 0,
            }
        }

        fn total_calls(&self) -> usize {
            self.range_queries
                + self.line_queries
                + self.writebacks
                + self.invalidates
                + self.freezes
                + self.unfreezes
        }
    }

    // Interior mutability keeps the counters reachable through the &self
    // query methods without wiring up a shared log.
    impl CacheController for &core::cell::RefCell<CountingCtrl> {
        fn caps(&self) -> CacheCaps {
            self.borrow().caps
        }

        fn data_line_size(&self) -> usize {
            let mut c = self.borrow_mut();
            c.line_queries += 1;
            c.line_size
        }

        fn is_valid_data_range(&self, addr: usize, _len: usize) -> bool {
            let mut c = self.borrow_mut();
            c.range_queries += 1;
            addr >= 0x3C00_0000
        }

        fn freeze(&mut self) {
            self.borrow_mut().freezes += 1;
        }

        fn unfreeze(&mut self) {
            self.borrow_mut().unfreezes += 1;
        }

        fn writeback(&mut self, _addr: usize, _len: usize) {
            self.borrow_mut().writebacks += 1;
        }

        fn invalidate(&mut self, _addr: usize, _len: usize) {
            self.borrow_mut().invalidates += 1;
        }
    }

    fn sync_on(
        ctrl: &core::cell::RefCell<CountingCtrl>,
    ) -> CacheSync<&core::cell::RefCell<CountingCtrl>, NoopRawMutex> {
        CacheSync::new(ctrl, NoopRawMutex::new())
    }

    #[test]
    fn null_address_is_rejected_before_any_query() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        assert_eq!(
            cache.msync(0, 64, SyncFlags::MEM_TO_CPU).unwrap_err(),
            SyncError::NullAddress
        );
        assert_eq!(ctrl.borrow().total_calls(), 0);
    }

    #[test]
    fn direction_conflict_is_rejected_before_any_query() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        let flags = SyncFlags::CPU_TO_MEM | SyncFlags::MEM_TO_CPU;
        assert_eq!(
            cache.msync(0x3FC0_0000, 64, flags).unwrap_err(),
            SyncError::ConflictingDirections
        );
        assert_eq!(ctrl.borrow().total_calls(), 0);
    }

    #[test]
    fn writeback_on_write_through_chip_is_a_silent_no_op() {
        // ESP32: write-through data cache, nothing can be dirty.
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32));
        let mut cache = sync_on(&ctrl);
        // Even a misaligned out-of-range request succeeds: the short-circuit
        // precedes the range and alignment stages.
        cache.msync(0x1000_0003, 10, SyncFlags::CPU_TO_MEM).unwrap();
        assert_eq!(ctrl.borrow().total_calls(), 0);
    }

    #[test]
    fn invalid_range_is_rejected_after_the_range_query() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        assert_eq!(
            cache.msync(0x1000, 64, SyncFlags::MEM_TO_CPU).unwrap_err(),
            SyncError::InvalidRange
        );
        let c = ctrl.borrow();
        assert_eq!(c.range_queries, 1);
        assert_eq!(c.invalidates, 0);
        assert_eq!(c.freezes, 0);
    }

    #[test]
    fn overflowing_range_is_rejected_without_a_range_query() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        assert_eq!(
            cache
                .msync(usize::MAX - 16, 64, SyncFlags::MEM_TO_CPU)
                .unwrap_err(),
            SyncError::InvalidRange
        );
        // The range contract promises implementations a non-overflowing
        // addr + len; the overflow check must therefore come first.
        assert_eq!(ctrl.borrow().range_queries, 0);
    }

    #[test]
    fn strict_writeback_checks_alignment_and_names_the_line_size() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        assert_eq!(
            cache
                .msync(0x3FC0_0000, 10, SyncFlags::CPU_TO_MEM)
                .unwrap_err(),
            SyncError::Misaligned { line_size: 32 }
        );
        let c = ctrl.borrow();
        assert_eq!(c.line_queries, 1);
        assert_eq!(c.writebacks, 0);
        assert_eq!(c.freezes, 0);
    }

    #[test]
    fn invalidate_never_consults_the_line_size() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        cache.msync(0x3FC0_0003, 10, SyncFlags::MEM_TO_CPU).unwrap();
        let c = ctrl.borrow();
        assert_eq!(c.line_queries, 0);
        assert_eq!(c.invalidates, 1);
    }

    #[test]
    fn allow_unaligned_skips_the_line_size_query() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        cache
            .msync(
                0x3FC0_0003,
                10,
                SyncFlags::CPU_TO_MEM | SyncFlags::ALLOW_UNALIGNED,
            )
            .unwrap();
        let c = ctrl.borrow();
        assert_eq!(c.line_queries, 0);
        assert_eq!(c.writebacks, 1);
    }

    #[test]
    fn freeze_is_skipped_where_unsupported() {
        // ESP32-S2: write-back but no freeze facility.
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S2));
        let mut cache = sync_on(&ctrl);
        cache.msync(0x3FC0_0000, 64, SyncFlags::CPU_TO_MEM).unwrap();
        let c = ctrl.borrow();
        assert_eq!(c.writebacks, 1);
        assert_eq!(c.freezes, 0);
        assert_eq!(c.unfreezes, 0);
    }

    #[test]
    fn freeze_and_unfreeze_are_paired_where_supported() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        cache.msync(0x3FC0_0000, 64, SyncFlags::MEM_TO_CPU).unwrap();
        let c = ctrl.borrow();
        assert_eq!(c.freezes, 1);
        assert_eq!(c.unfreezes, 1);
    }

    #[test]
    fn convenience_wrappers_map_to_the_expected_primitives() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);

        cache.writeback(0x3FC0_0000, 64).unwrap();
        assert_eq!(ctrl.borrow().writebacks, 1);
        assert_eq!(ctrl.borrow().invalidates, 0);

        cache.invalidate(0x3FC0_0000, 64).unwrap();
        assert_eq!(ctrl.borrow().invalidates, 1);

        cache.evict(0x3FC0_0000, 64).unwrap();
        assert_eq!(ctrl.borrow().writebacks, 2);
        assert_eq!(ctrl.borrow().invalidates, 2);
    }

    #[test]
    fn zero_length_range_passes_through() {
        let ctrl = core::cell::RefCell::new(CountingCtrl::new(soc_caps::targets::ESP32_S3));
        let mut cache = sync_on(&ctrl);
        cache.msync(0x3FC0_0000, 0, SyncFlags::CPU_TO_MEM).unwrap();
        assert_eq!(ctrl.borrow().writebacks, 1);
    }
}
