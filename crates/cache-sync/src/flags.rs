//! Request flags for the maintenance operation.
//!
//! A request carries exactly one direction plus optional modifiers. The
//! bit-set can represent invalid combinations (both directions, neither
//! direction); [`SyncFlags::direction`] is the single place that rejects
//! them, and the operation calls it before touching any hardware.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use crate::error::SyncError;

/// Bit-set of request flags.
///
/// Compose with `|`:
///
/// ```
/// use cache_sync::SyncFlags;
///
/// let flags = SyncFlags::CPU_TO_MEM | SyncFlags::INVALIDATE_AFTER_WRITEBACK;
/// assert!(flags.contains(SyncFlags::CPU_TO_MEM));
/// assert!(!flags.contains(SyncFlags::ALLOW_UNALIGNED));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncFlags(u32);

impl SyncFlags {
    /// Flush direction: write dirty cache lines back to memory so external
    /// readers (DMA engines, other cores) observe the CPU's writes.
    pub const CPU_TO_MEM: Self = Self(1 << 0);

    /// Discard direction: drop cached copies so the CPU's next reads come
    /// from memory written behind its back.
    pub const MEM_TO_CPU: Self = Self(1 << 1);

    /// Skip the cache-line alignment check on writebacks. The hardware
    /// widens the span to whole lines, which also writes back unrelated
    /// bytes sharing the first and last line. Callers take responsibility
    /// for that spill; prefer [`expand_to_lines`](crate::align::expand_to_lines)
    /// where the neighbouring bytes are not theirs to touch.
    pub const ALLOW_UNALIGNED: Self = Self(1 << 2);

    /// After the writeback completes, also drop the written-back lines.
    /// Only meaningful with [`CPU_TO_MEM`](Self::CPU_TO_MEM); ignored on
    /// invalidate requests, which already discard.
    pub const INVALIDATE_AFTER_WRITEBACK: Self = Self(1 << 3);

    /// The empty set. Not a valid request on its own (a direction is
    /// mandatory); useful as a fold seed.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// True when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set union, usable in const context where `|` is not.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Resolve the transfer direction.
    ///
    /// # Errors
    ///
    /// [`SyncError::ConflictingDirections`] when both direction bits are
    /// set, [`SyncError::MissingDirection`] when neither is. Requests that
    /// state no direction are rejected rather than defaulted: on
    /// write-through targets a defaulted writeback would silently do
    /// nothing, hiding the caller's mistake.
    pub fn direction(self) -> Result<Direction, SyncError> {
        match (
            self.contains(Self::CPU_TO_MEM),
            self.contains(Self::MEM_TO_CPU),
        ) {
            (true, true) => Err(SyncError::ConflictingDirections),
            (true, false) => Ok(Direction::CpuToMem),
            (false, true) => Ok(Direction::MemToCpu),
            (false, false) => Err(SyncError::MissingDirection),
        }
    }
}

impl BitOr for SyncFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for SyncFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for SyncFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SyncFlags, &str); 4] = [
            (SyncFlags::CPU_TO_MEM, "CPU_TO_MEM"),
            (SyncFlags::MEM_TO_CPU, "MEM_TO_CPU"),
            (SyncFlags::ALLOW_UNALIGNED, "ALLOW_UNALIGNED"),
            (
                SyncFlags::INVALIDATE_AFTER_WRITEBACK,
                "INVALIDATE_AFTER_WRITEBACK",
            ),
        ];

        f.write_str("SyncFlags(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("<empty>")?;
        }
        f.write_str(")")
    }
}

/// Resolved transfer direction of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Writeback: cache content flows out to memory.
    CpuToMem,
    /// Invalidate: memory content becomes visible to the CPU.
    MemToCpu,
}
