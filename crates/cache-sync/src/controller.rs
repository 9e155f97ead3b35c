//! Hardware abstraction the maintenance operation drives.
//!
//! Register-level implementations live in the per-target HAL; this crate
//! only needs the handful of primitives below. Implementations are
//! infallible by contract: the operation validates every range before
//! handing it down, so the primitives never see an address they must
//! reject.

use soc_caps::CacheCaps;

/// Low-level cache and address-map primitives for one target.
///
/// # Call discipline
///
/// The maintenance operation upholds these rules, and implementations may
/// rely on them:
///
/// - [`writeback`](Self::writeback) is called only when
///   [`caps().writeback_supported`](CacheCaps::writeback_supported);
///   [`freeze`](Self::freeze) / [`unfreeze`](Self::unfreeze) only when
///   [`caps().freeze_supported`](CacheCaps::freeze_supported).
/// - `freeze` and `unfreeze` are paired 1:1 and never nested.
/// - `writeback` and `invalidate` receive ranges already vouched for by
///   [`is_valid_data_range`](Self::is_valid_data_range), with `addr + len`
///   known not to overflow.
/// - All of `freeze`, `unfreeze`, `writeback`, `invalidate` and
///   [`data_line_size`](Self::data_line_size) are invoked inside the
///   interrupt-safe guard, so implementations need no locking of their own.
pub trait CacheController {
    /// Capability descriptor of the cache this controller drives.
    ///
    /// Pure configuration data; reading it must not touch hardware.
    fn caps(&self) -> CacheCaps;

    /// Data-cache line size currently in effect, in bytes. Always a
    /// positive power of two, and one of
    /// [`caps().data_cache_line_sizes`](CacheCaps::data_cache_line_sizes).
    fn data_line_size(&self) -> usize;

    /// Whether `[addr, addr + len)` lies entirely inside externally
    /// addressable data memory (the regions DMA engines and other cores can
    /// reach). Instruction-only and internal regions do not qualify.
    fn is_valid_data_range(&self, addr: usize, len: usize) -> bool;

    /// Suspend cache line allocation and eviction so a sequence of
    /// maintenance operations observes a stable cache state.
    ///
    /// The default is a no-op for targets without a freeze facility;
    /// targets that support it override both this and
    /// [`unfreeze`](Self::unfreeze).
    fn freeze(&mut self) {}

    /// Resume normal cache operation after [`freeze`](Self::freeze).
    fn unfreeze(&mut self) {}

    /// Write dirty lines intersecting `[addr, addr + len)` back to memory.
    fn writeback(&mut self, addr: usize, len: usize);

    /// Drop cached copies of lines intersecting `[addr, addr + len)`.
    /// Dirty lines are discarded without writeback.
    fn invalidate(&mut self, addr: usize, len: usize);
}
