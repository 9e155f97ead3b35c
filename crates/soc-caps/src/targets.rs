//! Pre-configured capability descriptors
//!
//! Per-chip cache capability tables for the ESP32 family, taken from the
//! technical reference manuals.

use crate::{CacheCaps, CpuArch};

/// ESP32 (dual-core Xtensa LX6)
///
/// - Data cache: write-through, 32-byte lines (fixed)
/// - No freeze mode
///
/// With a write-through cache a CPU-to-memory sync has nothing to flush;
/// only memory-to-CPU invalidation matters on this chip.
pub const ESP32: CacheCaps = CacheCaps {
    soc: "esp32",
    arch: CpuArch::Xtensa,
    cores: 2,
    data_cache_line_sizes: &[32],
    freeze_supported: false,
    writeback_supported: false,
};

/// ESP32-S2 (single-core Xtensa LX7)
///
/// - Data cache: write-back, 16 or 32-byte lines (boot-time choice)
/// - No freeze mode
///
/// The only chip in the family with a write-back cache but no freeze.
/// Single-core, so masking interrupts around maintenance is enough to stop
/// every agent that could dirty a line mid-operation.
pub const ESP32_S2: CacheCaps = CacheCaps {
    soc: "esp32s2",
    arch: CpuArch::Xtensa,
    cores: 1,
    data_cache_line_sizes: &[16, 32],
    freeze_supported: false,
    writeback_supported: true,
};

/// ESP32-S3 (dual-core Xtensa LX7)
///
/// - Data cache: write-back, 16/32/64-byte lines (boot-time choice)
/// - Freeze mode supported
pub const ESP32_S3: CacheCaps = CacheCaps {
    soc: "esp32s3",
    arch: CpuArch::Xtensa,
    cores: 2,
    data_cache_line_sizes: &[16, 32, 64],
    freeze_supported: true,
    writeback_supported: true,
};

/// ESP32-C3 (single-core RV32IMC)
///
/// - Data cache: write-through, 32-byte lines (fixed)
/// - Freeze mode supported
pub const ESP32_C3: CacheCaps = CacheCaps {
    soc: "esp32c3",
    arch: CpuArch::RiscV,
    cores: 1,
    data_cache_line_sizes: &[32],
    freeze_supported: true,
    writeback_supported: false,
};

/// ESP32-C6 (single-core RV32IMAC)
///
/// - Data cache: write-through, 32-byte lines (fixed)
/// - Freeze mode supported
pub const ESP32_C6: CacheCaps = CacheCaps {
    soc: "esp32c6",
    arch: CpuArch::RiscV,
    cores: 1,
    data_cache_line_sizes: &[32],
    freeze_supported: true,
    writeback_supported: false,
};

/// ESP32-H2 (single-core RV32IMAC)
///
/// - Data cache: write-through, 32-byte lines (fixed)
/// - Freeze mode supported
pub const ESP32_H2: CacheCaps = CacheCaps {
    soc: "esp32h2",
    arch: CpuArch::RiscV,
    cores: 1,
    data_cache_line_sizes: &[32],
    freeze_supported: true,
    writeback_supported: false,
};

/// Every chip this crate carries a descriptor for.
pub const ALL: &[CacheCaps] = &[ESP32, ESP32_S2, ESP32_S3, ESP32_C3, ESP32_C6, ESP32_H2];
