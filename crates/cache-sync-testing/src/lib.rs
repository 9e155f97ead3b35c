//! Host-side test doubles for the cache maintenance operation.
//!
//! The real hardware abstraction mutates cache state that a host test
//! cannot observe, so tests swap in [`MockCache`] and [`RecordingLock`]:
//! both append every contract call to a shared [`CallLog`], and the log
//! carries the structural assertions the operation's guarantees are phrased
//! in (nothing touched on rejection, freeze/unfreeze paired, all hardware
//! work inside the lock).
//!
//! # Quick start
//!
//! ```
//! use cache_sync::SyncFlags;
//! use cache_sync_testing::{harness, Event};
//!
//! let (mut cache, log) = harness(soc_caps::targets::ESP32_S3);
//!
//! cache.msync(0x3FC0_0000, 64, SyncFlags::CPU_TO_MEM).unwrap();
//!
//! log.assert_guarded();
//! log.assert_maintenance(&[
//!     Event::Freeze,
//!     Event::Writeback { addr: 0x3FC0_0000, len: 64 },
//!     Event::Unfreeze,
//! ]);
//! ```

#![warn(clippy::all)]
// Test support crate — assertion panics are the product here.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::arithmetic_side_effects)]

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use cache_sync::{CacheController, CacheSync, IsrLock};
use soc_caps::CacheCaps;

/// Address window [`MockCache`] treats as valid data memory unless
/// reprogrammed: the external-data bus region of the reference targets.
pub const DEFAULT_VALID_RANGE: Range<usize> = 0x3C00_0000..0x4000_0000;

// ─────────────────────────────────────────────────────────────────────────
// Event log
// ─────────────────────────────────────────────────────────────────────────

/// One recorded contract call.
///
/// Capability reads (`caps()`) are configuration data, not hardware
/// accesses, and are deliberately not recorded: the "zero hardware calls"
/// guarantees are phrased over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The guard was entered.
    LockAcquire,
    /// The guard was left.
    LockRelease,
    /// The data-cache line size was queried.
    LineSizeQuery,
    /// An address range was checked for validity.
    RangeQuery {
        /// Queried start address.
        addr: usize,
        /// Queried length in bytes.
        len: usize,
    },
    /// Cache allocation was suspended.
    Freeze,
    /// Cache allocation was resumed.
    Unfreeze,
    /// Dirty lines were written back.
    Writeback {
        /// Start address as handed to the hardware.
        addr: usize,
        /// Length in bytes as handed to the hardware.
        len: usize,
    },
    /// Cached copies were dropped.
    Invalidate {
        /// Start address as handed to the hardware.
        addr: usize,
        /// Length in bytes as handed to the hardware.
        len: usize,
    },
}

impl Event {
    /// True for the calls that mutate cache state (freeze, unfreeze,
    /// writeback, invalidate), as opposed to queries and lock traffic.
    pub fn is_maintenance(self) -> bool {
        matches!(
            self,
            Event::Freeze | Event::Unfreeze | Event::Writeback { .. } | Event::Invalidate { .. }
        )
    }
}

/// Shared, cloneable event log.
///
/// Clones share storage, so a test can keep one handle while moving others
/// into the mock and the lock.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Event>>>);

impl CallLog {
    /// A fresh, empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn record(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of everything recorded so far, in call order.
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Just the maintenance calls (see [`Event::is_maintenance`]), in call
    /// order.
    pub fn maintenance(&self) -> Vec<Event> {
        self.0
            .borrow()
            .iter()
            .copied()
            .filter(|e| e.is_maintenance())
            .collect()
    }

    /// Discard everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Assert that nothing at all was recorded, queries and lock traffic
    /// included. This is the postcondition of rejections that precede every
    /// collaborator call (null address, direction errors) and of the
    /// writeback-unsupported no-op.
    #[track_caller]
    pub fn assert_no_calls(&self) {
        let events = self.events();
        assert!(
            events.is_empty(),
            "expected no collaborator calls, recorded: {events:?}"
        );
    }

    /// Assert that no maintenance call was recorded. Validation stages may
    /// have queried the range or line size, but the cache was not touched.
    #[track_caller]
    pub fn assert_no_maintenance(&self) {
        let calls = self.maintenance();
        assert!(
            calls.is_empty(),
            "expected cache state untouched, recorded: {calls:?}"
        );
    }

    /// Assert the exact maintenance sequence, in order.
    #[track_caller]
    pub fn assert_maintenance(&self, expected: &[Event]) {
        assert_eq!(
            self.maintenance(),
            expected,
            "maintenance sequence mismatch (full log: {:?})",
            self.events()
        );
    }

    /// Assert every freeze has a matching unfreeze, in order and unnested,
    /// and that writebacks and invalidates only happen inside a frozen
    /// window when any freezing happened at all.
    #[track_caller]
    pub fn assert_freeze_balanced(&self) {
        let events = self.events();
        let froze = events.iter().any(|e| matches!(e, Event::Freeze));
        let mut frozen = false;
        for event in &events {
            match event {
                Event::Freeze => {
                    assert!(!frozen, "nested freeze: {events:?}");
                    frozen = true;
                }
                Event::Unfreeze => {
                    assert!(frozen, "unfreeze without freeze: {events:?}");
                    frozen = false;
                }
                Event::Writeback { .. } | Event::Invalidate { .. } if froze => {
                    assert!(frozen, "maintenance outside freeze window: {events:?}");
                }
                _ => {}
            }
        }
        assert!(!frozen, "freeze left unmatched: {events:?}");
    }

    /// Assert lock windows are properly bracketed and that every hardware
    /// call (queries included, except the range check) happened while the
    /// lock was held.
    ///
    /// The range check runs before locking on purpose: it is a pure address
    /// map lookup, and rejecting early keeps the interrupt-masked window as
    /// short as possible.
    #[track_caller]
    pub fn assert_guarded(&self) {
        let events = self.events();
        let mut held = false;
        for event in &events {
            match event {
                Event::LockAcquire => {
                    assert!(!held, "nested lock acquisition: {events:?}");
                    held = true;
                }
                Event::LockRelease => {
                    assert!(held, "release without acquire: {events:?}");
                    held = false;
                }
                Event::RangeQuery { .. } => {}
                _ => assert!(held, "{event:?} outside the guard: {events:?}"),
            }
        }
        assert!(!held, "lock left held: {events:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────
// RecordingLock
// ─────────────────────────────────────────────────────────────────────────

/// An [`IsrLock`] that records window boundaries and panics on the nested
/// acquisition the real lock would deadlock (or worse) on.
#[derive(Debug)]
pub struct RecordingLock {
    log: CallLog,
    held: Cell<bool>,
}

impl RecordingLock {
    /// A lock reporting into `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            held: Cell::new(false),
        }
    }
}

impl IsrLock for RecordingLock {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        assert!(
            !self.held.replace(true),
            "nested lock acquisition: the operation must never re-enter its own critical section"
        );
        self.log.record(Event::LockAcquire);
        let result = f();
        self.log.record(Event::LockRelease);
        self.held.set(false);
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────
// MockCache
// ─────────────────────────────────────────────────────────────────────────

/// A [`CacheController`] that records instead of touching hardware.
///
/// Beyond recording, it enforces the trait's call discipline: writeback on
/// a target without write-back support, or freeze without freeze support,
/// is a contract breach and panics the test.
#[derive(Debug)]
pub struct MockCache {
    caps: CacheCaps,
    line_size: usize,
    valid: Range<usize>,
    log: CallLog,
}

impl MockCache {
    /// A mock of the cache `caps` describes, reporting into `log`, with a
    /// 32-byte line and [`DEFAULT_VALID_RANGE`] as its data memory.
    pub fn new(caps: CacheCaps, log: CallLog) -> Self {
        Self {
            caps,
            line_size: 32,
            valid: DEFAULT_VALID_RANGE,
            log,
        }
    }

    /// Reconfigure the line size [`data_line_size`](CacheController::data_line_size)
    /// reports. Must be one of the descriptor's configurable sizes.
    #[must_use]
    pub fn with_line_size(mut self, line_size: usize) -> Self {
        assert!(
            self.caps.supports_line_size(line_size),
            "{} cannot be configured with {line_size}-byte lines",
            self.caps.soc
        );
        self.line_size = line_size;
        self
    }

    /// Reprogram the address window treated as valid data memory.
    #[must_use]
    pub fn with_valid_range(mut self, valid: Range<usize>) -> Self {
        self.valid = valid;
        self
    }
}

impl CacheController for MockCache {
    fn caps(&self) -> CacheCaps {
        self.caps
    }

    fn data_line_size(&self) -> usize {
        self.log.record(Event::LineSizeQuery);
        self.line_size
    }

    fn is_valid_data_range(&self, addr: usize, len: usize) -> bool {
        self.log.record(Event::RangeQuery { addr, len });
        match addr.checked_add(len) {
            Some(end) => addr >= self.valid.start && end <= self.valid.end,
            None => false,
        }
    }

    fn freeze(&mut self) {
        assert!(
            self.caps.freeze_supported,
            "freeze called on {}, which has no freeze facility",
            self.caps.soc
        );
        self.log.record(Event::Freeze);
    }

    fn unfreeze(&mut self) {
        assert!(
            self.caps.freeze_supported,
            "unfreeze called on {}, which has no freeze facility",
            self.caps.soc
        );
        self.log.record(Event::Unfreeze);
    }

    fn writeback(&mut self, addr: usize, len: usize) {
        assert!(
            self.caps.writeback_supported,
            "writeback called on {}, whose data cache is write-through",
            self.caps.soc
        );
        self.log.record(Event::Writeback { addr, len });
    }

    fn invalidate(&mut self, addr: usize, len: usize) {
        self.log.record(Event::Invalidate { addr, len });
    }
}

/// A ready-to-use handle over a [`MockCache`] and [`RecordingLock`] for the
/// chip `caps` describes, plus the log both report into.
pub fn harness(caps: CacheCaps) -> (CacheSync<MockCache, RecordingLock>, CallLog) {
    let log = CallLog::new();
    let cache = CacheSync::new(
        MockCache::new(caps, log.clone()),
        RecordingLock::new(log.clone()),
    );
    (cache, log)
}
