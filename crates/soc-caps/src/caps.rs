//! Cache capability descriptor types
//!
//! Describes what one SoC's cache hardware can do, for drivers that must
//! pick a maintenance strategy at runtime rather than at compile time.

/// CPU instruction-set family of a SoC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CpuArch {
    /// Cadence Xtensa LX6/LX7 cores (ESP32, ESP32-S2, ESP32-S3).
    Xtensa,
    /// RV32IMC cores (ESP32-C3 and newer).
    RiscV,
}

/// Cache-maintenance capabilities of one SoC.
///
/// Everything a coherency driver needs to know about a chip before touching
/// its cache:
/// - whether the data cache is write-back (dirty lines can exist) or
///   write-through (stores reach memory immediately),
/// - whether the cache supports a freeze mode that blocks allocation while
///   maintenance is in flight,
/// - which data-cache line sizes the chip can be configured with,
/// - how many cores share the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CacheCaps {
    /// Chip name (e.g. "esp32s3")
    pub soc: &'static str,

    /// CPU instruction-set family
    pub arch: CpuArch,

    /// Number of cores that share the cache
    pub cores: u8,

    /// Data-cache line sizes (bytes) the chip can be configured with.
    ///
    /// The active size is a boot-time choice; query the cache driver for
    /// the one actually in effect.
    pub data_cache_line_sizes: &'static [usize],

    /// Whether the cache can be frozen (allocation blocked, hits still
    /// served) while maintenance runs
    pub freeze_supported: bool,

    /// Whether the data cache is write-back.
    ///
    /// On write-through chips there is never a dirty line, so a
    /// CPU-to-memory sync has nothing to do.
    pub writeback_supported: bool,
}

impl CacheCaps {
    /// Check whether `size` is one of the configurable data-cache line sizes.
    pub fn supports_line_size(&self, size: usize) -> bool {
        self.data_cache_line_sizes.contains(&size)
    }

    /// Smallest configurable data-cache line size, in bytes.
    pub fn min_line_size(&self) -> Option<usize> {
        self.data_cache_line_sizes.iter().copied().min()
    }

    /// Largest configurable data-cache line size, in bytes.
    ///
    /// Buffers padded to this size stay line-aligned under every cache
    /// configuration the chip supports.
    pub fn max_line_size(&self) -> Option<usize> {
        self.data_cache_line_sizes.iter().copied().max()
    }
}
