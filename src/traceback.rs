//! Traceback (component C5): walks the direction matrix from the configured
//! end cell back to an origin, emitting a trace-segment sequence.
//!
//! Grounded on the iterative bit-directed walk in
//! `other_examples/77d44385_..._algorithm.rs` (`find_all_paths_linear`,
//! simplified here to one canonical path instead of enumerating all optimal
//! paths) and the `Moves`-driven loop in
//! `other_examples/1500c71a_..._semiglobal.rs` for the affine layer-switch
//! discipline (entering/staying in the insert/delete layer until the
//! recorded predecessor mode changes).

use crate::band::BandGeometry;
use crate::kernel::{h_opened, m_dir, v_opened, DIR_DIAG, DIR_LEFT, DIR_STOP, DIR_UP};
use crate::options::FreeEndGaps;
use crate::scalar::DirectionMatrix;
use crate::trace::{SegmentKind, Trace, TraceBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    M,
    H,
    V,
}

/// Walks `directions` from `start` back toward the origin, per
/// SPEC_FULL.md §4.5. `affine` selects whether `Up`/`Left` steps persist
/// into a latched H/V layer (Gotoh) or immediately re-examine the next
/// cell's own M-level choice (linear has no separate gap layer at all).
pub fn walk(
    directions: &DirectionMatrix,
    band: &BandGeometry,
    start: (usize, usize),
    _flags: FreeEndGaps,
    affine: bool,
) -> Trace {
    let (mut i, mut j) = start;
    let mut layer = Layer::M;
    let mut builder = TraceBuilder::default();

    loop {
        if i == 0 && j == 0 {
            break;
        }
        // Defensive: a misconfigured band (declared but practically
        // unreachable origin) can leave the walk outside the matrix the
        // direction matrix actually populated. Stop rather than panic.
        let Some(dir) = directions.get(band, i, j) else {
            break;
        };

        match layer {
            Layer::M => match m_dir(dir) {
                DIR_STOP => break,
                DIR_DIAG => {
                    builder.push_unit(SegmentKind::Match, i, j);
                    i -= 1;
                    j -= 1;
                }
                DIR_UP => {
                    builder.push_unit(SegmentKind::GapInH, i, j);
                    i -= 1;
                    layer = if affine && !h_opened(dir) { Layer::H } else { Layer::M };
                }
                DIR_LEFT => {
                    builder.push_unit(SegmentKind::GapInV, i, j);
                    j -= 1;
                    layer = if affine && !v_opened(dir) { Layer::V } else { Layer::M };
                }
                _ => unreachable!("2-bit m_dir covers DIAG/UP/LEFT/STOP exhaustively"),
            },
            Layer::H => {
                if i == 0 {
                    break;
                }
                builder.push_unit(SegmentKind::GapInH, i, j);
                let was_open = h_opened(dir);
                i -= 1;
                layer = if was_open { Layer::M } else { Layer::H };
            }
            Layer::V => {
                if j == 0 {
                    break;
                }
                builder.push_unit(SegmentKind::GapInV, i, j);
                let was_open = v_opened(dir);
                j -= 1;
                layer = if was_open { Layer::M } else { Layer::V };
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::scalar::{select_end_cell, sweep_affine, sweep_linear};
    use crate::scoring::{Affine, MatchMismatch};

    #[test]
    fn linear_all_match_trace_is_one_segment() {
        let band = BandGeometry::new(4, 4, 0, 0).unwrap();
        let scoring = MatchMismatch::new(1, -1, -2);
        let flags = FreeEndGaps::default();
        let fwd = sweep_linear(b"AAAA", b"AAAA", &scoring, flags, &band, true, &CancellationToken::new()).unwrap();
        let (i, j, score) = select_end_cell(4, 4, flags, &fwd.scores);
        assert_eq!(score, 4);
        let trace = walk(fwd.directions.as_ref().unwrap(), &band, (i, j), flags, false);
        assert_eq!(trace.0.len(), 1);
        assert_eq!(trace.0[0].kind, SegmentKind::Match);
        assert_eq!(trace.0[0].length, 4);
        assert_eq!(trace.alignment_length(), 4);
    }

    #[test]
    fn affine_gap_coalesces_into_single_segment() {
        // seqH="AATTGG", seqV="AAGG": expect a single affine gap of length 2.
        let band = BandGeometry::new(6, 4, -2, 2).unwrap();
        let scoring = Affine::new(1, -1, -3, -1);
        let flags = FreeEndGaps::default();
        let fwd = sweep_affine(b"AATTGG", b"AAGG", &scoring, flags, &band, true, &CancellationToken::new()).unwrap();
        let (i, j, score) = select_end_cell(6, 4, flags, &fwd.scores);
        assert_eq!(score, 1);
        let trace = walk(fwd.directions.as_ref().unwrap(), &band, (i, j), flags, true);
        let gap_segments: Vec<_> = trace
            .0
            .iter()
            .filter(|s| s.kind != SegmentKind::Match)
            .collect();
        assert_eq!(gap_segments.len(), 1);
        assert_eq!(gap_segments[0].length, 2);
    }

    #[test]
    fn free_top_end_gap_elides_leading_border() {
        // See the note on `free_top_end_gap_matches_scenario_3` in scalar.rs:
        // this is SPEC_FULL.md §8 scenario 3, which needs `top` (not the
        // scenario's literal `left` label) to reproduce score 6.
        let band = BandGeometry::new(4, 3, -1, 1).unwrap();
        let scoring = MatchMismatch::new(2, -1, -3);
        let flags = FreeEndGaps { top: true, ..Default::default() };
        let fwd = sweep_linear(b"ACGT", b"CGT", &scoring, flags, &band, true, &CancellationToken::new()).unwrap();
        let (i, j, score) = select_end_cell(4, 3, flags, &fwd.scores);
        assert_eq!(score, 6);
        let trace = walk(fwd.directions.as_ref().unwrap(), &band, (i, j), flags, false);
        // No leading gap-in-V segment should be emitted; the free border is elided.
        assert!(trace.0.iter().all(|s| s.kind != SegmentKind::GapInV));
    }
}
