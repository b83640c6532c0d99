//! Error kinds surfaced synchronously by the facade (C7).
//!
//! See SPEC_FULL.md §7: every fallible entry point returns `Result<T, AlignError>`.
//! `Cancelled` doubles as a distinguished partial-result marker for batch calls
//! rather than a pure defect, but it is still modeled here so that a single
//! `Result` type covers every exit path.

use thiserror::Error;

/// Everything that can go wrong constructing or running a banded alignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The requested band (L, U) does not admit the end cell (m, n).
    #[error("band [{l}, {u}] excludes the end cell ({m}, {n}): need {l} <= {m} - {n} <= {u}")]
    BandExcludesEnd { l: i64, u: i64, m: usize, n: usize },

    /// Some row required by the sweep has no valid column in the band.
    #[error("band [{l}, {u}] leaves row {row} with no valid column (of {m} columns, {n} rows)")]
    EmptyBand { l: i64, u: i64, row: usize, m: usize, n: usize },

    /// The forward sweep's accumulated score saturated the chosen score type.
    ///
    /// The scalar driver (C4) accumulates in `Cost = i64`, wide enough per
    /// SPEC_FULL.md §3 that no realistic band/sequence-length combination
    /// saturates it, so nothing in `scalar.rs` ever constructs this variant.
    /// The SIMD driver (C6) narrows each lane to `i16` for throughput and
    /// detects saturation there instead, via its own per-lane `saturated`
    /// flag (`simd.rs`) that triggers a scalar re-run rather than surfacing
    /// this error -- this variant stays in the public enum for a future or
    /// alternate scalar score type that is not `i64`-wide.
    #[error("score overflowed the {width}-bit score type during the forward sweep")]
    ScoreOverflow { width: u32 },

    /// Paired-batch inputs of unequal length.
    #[error("batch inputs have mismatched lengths: {seqs_h} seqH sequences vs {seqs_v} seqV sequences")]
    MismatchedBatch { seqs_h: usize, seqs_v: usize },

    /// The caller's cancellation token was observed tripped mid-sweep.
    #[error("alignment cancelled before completion")]
    Cancelled,
}

impl AlignError {
    pub(crate) fn band_excludes_end(l: i64, u: i64, m: usize, n: usize) -> Self {
        let err = Self::BandExcludesEnd { l, u, m, n };
        tracing::warn!(l, u, m, n, "band excludes end cell");
        err
    }

    pub(crate) fn empty_band(l: i64, u: i64, row: usize, m: usize, n: usize) -> Self {
        let err = Self::EmptyBand { l, u, row, m, n };
        tracing::warn!(l, u, row, m, n, "band has an empty row");
        err
    }

    pub(crate) fn mismatched_batch(seqs_h: usize, seqs_v: usize) -> Self {
        let err = Self::MismatchedBatch { seqs_h, seqs_v };
        tracing::warn!(seqs_h, seqs_v, "mismatched batch lengths");
        err
    }
}
