//! Banded Needleman-Wunsch/Gotoh global alignment (SPEC_FULL.md's C7 facade).
//!
//! Dispatches a scoring scheme and a pair (or batch) of sequences to the
//! scalar driver (C4/C5) or, for large enough linear-gap batches, the SIMD
//! driver (C6), and hands back a score and/or [`trace::Trace`].

pub mod band;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod kernel;
pub mod options;
pub mod scalar;
pub mod scoring;
#[cfg(feature = "simd")]
pub mod simd;
pub mod trace;
pub mod traceback;

use cancellation::CancellationToken;
use error::AlignError;
use options::FreeEndGaps;
use scalar::{select_end_cell, sweep_affine, sweep_linear};
use scoring::{Cost, Scoring};
use trace::Trace;

/// Runs one alignment and returns only its score, under an uncancellable
/// token. See [`global_alignment_score_cancellable`] to drive long bands
/// cooperatively.
pub fn global_alignment_score(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
) -> Result<Cost, AlignError> {
    global_alignment_score_cancellable(seq_h, seq_v, scoring, flags, l, u, &CancellationToken::new())
}

/// As [`global_alignment_score`], observing `cancel` between sweep rows.
pub fn global_alignment_score_cancellable(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
    cancel: &CancellationToken,
) -> Result<Cost, AlignError> {
    let band = band::BandGeometry::new(seq_h.len(), seq_v.len(), l, u)?;
    let fwd = if scoring.is_linear() {
        sweep_linear(seq_h, seq_v, scoring, flags, &band, false, cancel)?
    } else {
        sweep_affine(seq_h, seq_v, scoring, flags, &band, false, cancel)?
    };
    let (_, _, score) = select_end_cell(band.m(), band.n(), flags, &fwd.scores);
    Ok(score)
}

/// Runs one alignment and returns its score plus a traceback.
pub fn global_alignment(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
) -> Result<(Cost, Trace), AlignError> {
    global_alignment_cancellable(seq_h, seq_v, scoring, flags, l, u, &CancellationToken::new())
}

/// As [`global_alignment`], observing `cancel` between sweep rows.
pub fn global_alignment_cancellable(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
    cancel: &CancellationToken,
) -> Result<(Cost, Trace), AlignError> {
    let band = band::BandGeometry::new(seq_h.len(), seq_v.len(), l, u)?;
    let affine = !scoring.is_linear();
    let fwd = if affine {
        sweep_affine(seq_h, seq_v, scoring, flags, &band, true, cancel)?
    } else {
        sweep_linear(seq_h, seq_v, scoring, flags, &band, true, cancel)?
    };
    let (i, j, score) = select_end_cell(band.m(), band.n(), flags, &fwd.scores);
    let directions = fwd.directions.expect("want_trace = true always populates directions");
    let trace = traceback::walk(&directions, &band, (i, j), flags, affine);
    Ok((score, trace))
}

/// Scores a batch of independent pairs sharing one scoring scheme, flag set,
/// and band. `seqs_h`/`seqs_v` must have equal length (else
/// [`AlignError::MismatchedBatch`]).
///
/// Per SPEC_FULL.md §4.7: dispatches to the SIMD driver (C6) when the `simd`
/// feature is enabled, the batch is at least [`config::MIN_SIMD_BATCH`]
/// pairs, `scoring` is linear, and neither `flags.right` nor `flags.bottom`
/// is set (the SIMD driver only extracts each lane's corner cell, not the
/// border-max `select_end_cell` search those flags require); any pair
/// excluded from that (an affine scheme, a tail shorter than one full SIMD
/// batch, or free trailing end gaps) runs through the scalar driver instead,
/// one pair at a time.
pub fn batch_alignment_scores(
    seqs_h: &[&[u8]],
    seqs_v: &[&[u8]],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
) -> Result<Vec<Cost>, AlignError> {
    batch_alignment_scores_cancellable(seqs_h, seqs_v, scoring, flags, l, u, &CancellationToken::new())
}

/// As [`batch_alignment_scores`], observing `cancel` between rows/batches.
pub fn batch_alignment_scores_cancellable(
    seqs_h: &[&[u8]],
    seqs_v: &[&[u8]],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
    cancel: &CancellationToken,
) -> Result<Vec<Cost>, AlignError> {
    if seqs_h.len() != seqs_v.len() {
        return Err(AlignError::mismatched_batch(seqs_h.len(), seqs_v.len()));
    }
    let w = seqs_h.len();
    let mut scores = vec![0 as Cost; w];

    // `run_batch_linear` only ever extracts each lane's score at the band's
    // corner (n_i, m_i); it does not implement `select_end_cell`'s
    // border-max search, so a batch requesting `right`/`bottom` must fall
    // back to the scalar driver (per-pair) to get the correct end cell.
    #[cfg(feature = "simd")]
    let simd_eligible = scoring.is_linear() && w >= config::MIN_SIMD_BATCH && !flags.right && !flags.bottom;
    #[cfg(not(feature = "simd"))]
    let simd_eligible = false;

    if simd_eligible {
        #[cfg(feature = "simd")]
        {
            let mut idx = 0usize;
            while idx < w {
                if cancel.is_cancelled() {
                    return Err(AlignError::Cancelled);
                }
                let end = (idx + simd::LANES).min(w);
                let chunk_h = &seqs_h[idx..end];
                let chunk_v = &seqs_v[idx..end];
                if chunk_h.len() >= config::MIN_SIMD_BATCH {
                    let result = simd::run_batch_linear(chunk_h, chunk_v, scoring, flags, l, u, cancel)?;
                    for (lane, (&h, &v)) in chunk_h.iter().zip(chunk_v.iter()).enumerate() {
                        if result.saturated[lane] {
                            scores[idx + lane] =
                                global_alignment_score_cancellable(h, v, scoring, flags, l, u, cancel)?;
                        } else {
                            scores[idx + lane] = result.scores[lane];
                        }
                    }
                } else {
                    for lane in 0..chunk_h.len() {
                        scores[idx + lane] = global_alignment_score_cancellable(
                            chunk_h[lane],
                            chunk_v[lane],
                            scoring,
                            flags,
                            l,
                            u,
                            cancel,
                        )?;
                    }
                }
                idx = end;
            }
            return Ok(scores);
        }
    }

    for (idx, (&h, &v)) in seqs_h.iter().zip(seqs_v.iter()).enumerate() {
        if cancel.is_cancelled() {
            return Err(AlignError::Cancelled);
        }
        scores[idx] = global_alignment_score_cancellable(h, v, scoring, flags, l, u, cancel)?;
    }
    Ok(scores)
}

/// Aligns a batch of independent pairs and returns score plus trace for
/// each. Always runs through the scalar driver (C4/C5): SPEC_FULL.md §4.6
/// requires traceback-bearing batches to either supply per-lane direction
/// matrices or fall back to scalar, and this facade takes the latter,
/// simpler option uniformly.
pub fn batch_alignment(
    seqs_h: &[&[u8]],
    seqs_v: &[&[u8]],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
) -> Result<Vec<(Cost, Trace)>, AlignError> {
    batch_alignment_cancellable(seqs_h, seqs_v, scoring, flags, l, u, &CancellationToken::new())
}

/// As [`batch_alignment`], observing `cancel` between pairs.
pub fn batch_alignment_cancellable(
    seqs_h: &[&[u8]],
    seqs_v: &[&[u8]],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    l: i64,
    u: i64,
    cancel: &CancellationToken,
) -> Result<Vec<(Cost, Trace)>, AlignError> {
    if seqs_h.len() != seqs_v.len() {
        return Err(AlignError::mismatched_batch(seqs_h.len(), seqs_v.len()));
    }
    seqs_h
        .iter()
        .zip(seqs_v.iter())
        .map(|(&h, &v)| global_alignment_cancellable(h, v, scoring, flags, l, u, cancel))
        .collect()
}
