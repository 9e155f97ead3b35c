//! Error type returned by the maintenance operation.
//!
//! Every rejection is reported before any hardware state changes: a caller
//! that receives an error can retry with corrected arguments knowing the
//! cache was not disturbed.

use thiserror_no_std::Error;

/// Why a maintenance request was rejected.
///
/// The variants mirror the validation steps in order: argument checks first,
/// then the address-range check, then the alignment check. Whichever step
/// fails first names the error; later steps never run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// The address was zero. Address 0 is never a valid data address on any
    /// supported target.
    #[error("address must not be zero")]
    NullAddress,

    /// Both direction flags were set. A single request flows one way;
    /// writeback-then-invalidate is requested via
    /// [`SyncFlags::INVALIDATE_AFTER_WRITEBACK`](crate::SyncFlags::INVALIDATE_AFTER_WRITEBACK),
    /// not by combining directions.
    #[error("writeback and invalidate directions are mutually exclusive")]
    ConflictingDirections,

    /// Neither direction flag was set, so there is nothing to do. Callers
    /// must state the direction explicitly.
    #[error("no direction flag set")]
    MissingDirection,

    /// The range is not entirely inside externally addressable data memory,
    /// or `addr + len` overflows the address space.
    #[error("range is not a valid data-memory region")]
    InvalidRange,

    /// A writeback was requested on a range that does not start and end on
    /// cache-line boundaries. Carries the line size the range was checked
    /// against so the caller can realign.
    #[error("address and length must be multiples of the {line_size}-byte cache line")]
    Misaligned {
        /// Data-cache line size, in bytes, in effect at the time of the call.
        line_size: usize,
    },
}
