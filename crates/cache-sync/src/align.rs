//! Cache-line arithmetic.
//!
//! Helpers for callers that would rather widen a range to whole lines than
//! request an unaligned writeback. Widening keeps the spill explicit: the
//! caller sees exactly which extra bytes the operation will touch.
//!
//! All helpers take the line size as an argument; query it from the handle
//! ([`CacheSync::data_line_size`](crate::CacheSync::data_line_size)) rather
//! than hard-coding a per-target constant. Line sizes are positive powers of
//! two on every supported target.

/// True when `addr` and `len` are both multiples of `line_size`.
///
/// This is the exact check a strict (non-[`ALLOW_UNALIGNED`]) writeback
/// request must pass.
///
/// [`ALLOW_UNALIGNED`]: crate::SyncFlags::ALLOW_UNALIGNED
#[must_use]
pub fn is_line_aligned(addr: usize, len: usize, line_size: usize) -> bool {
    addr.is_multiple_of(line_size) && len.is_multiple_of(line_size)
}

/// Round `value` down to the previous multiple of `line_size`.
#[must_use]
pub const fn align_down(value: usize, line_size: usize) -> usize {
    value & !line_size.wrapping_sub(1)
}

/// Round `value` up to the next multiple of `line_size`, or `None` when the
/// rounded value does not fit in the address space.
#[must_use]
pub const fn align_up(value: usize, line_size: usize) -> Option<usize> {
    let mask = line_size.wrapping_sub(1);
    match value.checked_add(mask) {
        Some(bumped) => Some(bumped & !mask),
        None => None,
    }
}

/// Widen `[addr, addr + len)` to the smallest line-aligned range covering
/// it, returned as `(addr, len)`. `None` when the widened range does not
/// fit in the address space.
///
/// A zero-length range on an unaligned address widens to the single line
/// containing `addr`.
#[must_use]
pub fn expand_to_lines(addr: usize, len: usize, line_size: usize) -> Option<(usize, usize)> {
    let start = align_down(addr, line_size);
    let end = align_up(addr.checked_add(len)?, line_size)?;
    // end >= start: align_up never moves below its input, align_down never
    // moves above.
    Some((start, end.wrapping_sub(start)))
}
