//! Explicit cache maintenance for DMA-visible memory
//!
//! On the ESP32 family the CPU cache is not snooped: when a DMA engine,
//! peripheral, or second core writes memory behind the cache's back, or
//! reads memory the CPU has only written into its cache, software must fix
//! the mismatch by hand. This crate is that fix — one operation,
//! [`CacheSync::msync`], that writes dirty lines back to memory
//! (CPU-to-memory) or discards stale cached copies (memory-to-CPU) over a
//! caller-supplied address range.
//!
//! The operation validates everything up front (address, range, direction,
//! line alignment) and then runs the hardware sequence inside an
//! interrupt-safe critical section, freezing the cache where the chip
//! supports it so an interrupt handler cannot repopulate lines
//! mid-maintenance. It never allocates, never blocks, and is callable from
//! interrupt context.
//!
//! The register-level primitives live behind the [`CacheController`] trait,
//! implemented by the per-target HAL; per-chip policy (write-back vs
//! write-through, freeze support, line sizes) is data in the `soc-caps`
//! crate.
//!
//! # Example
//!
//! ```
//! use cache_sync::{CacheSync, SyncFlags};
//! # use cache_sync::{CacheController, lock::NoopRawMutex};
//! # use soc_caps::CacheCaps;
//! # struct Ctrl;
//! # impl CacheController for Ctrl {
//! #     fn caps(&self) -> CacheCaps { soc_caps::targets::ESP32_S3 }
//! #     fn data_line_size(&self) -> usize { 32 }
//! #     fn is_valid_data_range(&self, _: usize, _: usize) -> bool { true }
//! #     fn writeback(&mut self, _: usize, _: usize) {}
//! #     fn invalidate(&mut self, _: usize, _: usize) {}
//! # }
//! # let mut cache = CacheSync::new(Ctrl, NoopRawMutex::new());
//!
//! // CPU filled a buffer; flush it so the DMA engine reads fresh data.
//! cache.msync(0x3FC0_0000, 512, SyncFlags::CPU_TO_MEM)?;
//!
//! // DMA filled a buffer; drop stale lines so the CPU reads fresh data.
//! cache.msync(0x3FC0_0000, 512, SyncFlags::MEM_TO_CPU)?;
//! # Ok::<(), cache_sync::SyncError>(())
//! ```
//!
//! # A deliberate asymmetry
//!
//! On chips whose data cache is write-through (no `writeback_supported` in
//! the capability descriptor) a CPU-to-memory request returns `Ok` without
//! doing anything: stores already reached memory, so there is nothing to
//! flush. Callers get coherency, not an error, on those chips — but they
//! also get no eviction, which matters if they actually wanted the line
//! gone. See [`CacheSync::msync`] for the details.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub mod align;
mod controller;
mod error;
mod flags;
pub mod lock;
mod sync;

pub use controller::CacheController;
pub use error::SyncError;
pub use flags::{Direction, SyncFlags};
pub use lock::IsrLock;
pub use sync::CacheSync;

// Descriptors travel with the trait: implementing `CacheController::caps`
// requires the type, so re-export it.
pub use soc_caps::{CacheCaps, CpuArch};
