//! Cache capability descriptors for ESP32-family SoCs
//!
//! Each supported chip gets a [`CacheCaps`] constant describing what its
//! cache hardware can do: whether dirty lines exist at all (write-back vs
//! write-through data cache), whether the cache can be frozen while another
//! agent touches memory, and which data-cache line sizes the chip can be
//! configured with.
//!
//! The descriptors are pure data. Drivers branch on them instead of on
//! `cfg` flags, so one binary image can carry the policy for the chip it
//! runs on and host tests can exercise every chip's policy without
//! cross-compiling.
//!
//! # Example
//!
//! ```
//! use soc_caps::targets::ESP32_S3;
//!
//! assert!(ESP32_S3.writeback_supported);
//! assert!(ESP32_S3.supports_line_size(64));
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // descriptor accessors — callers decide

mod caps;
pub mod targets;

pub use caps::{CacheCaps, CpuArch};
