//! This module contains constants used throughout the code, that may eventually
//! be turned into configurable options.

/// Enables extra `tracing::trace!` cell-level detail in the scalar driver.
/// Off by default: even at `trace` level this is too fine-grained for
/// anything but local debugging of the recurrence itself.
pub const DEBUG: bool = false;

/// Below this many sequence pairs, the batch facade runs the scalar driver
/// directly instead of packing SIMD lanes: lane setup/teardown would dominate.
pub const MIN_SIMD_BATCH: usize = 4;

/// Number of lanes packed per SIMD batch step. `wide::i16x16` holds 16
/// lanes of `i16` each; this is the lane count the batch driver (C6) packs
/// per step on every target (the `wide` crate falls back to a scalar-loop
/// emulation of the same width when no native SIMD is available).
pub const SIMD_LANES: usize = 16;
