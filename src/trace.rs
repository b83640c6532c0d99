//! Trace-segment output (the C5 traceback's public product).
//!
//! Replaces the teacher's `Cigar`/`CigarOp` (`src/aligners/cigar.rs`): same
//! run-length-coalescing `push` discipline, but the vocabulary is the
//! spec's `{match, gap-in-H, gap-in-V}` rather than the teacher's
//! per-affine-layer `CigarOp::Affine{Insertion,Deletion}(usize)` variants,
//! since this crate collapses the gap model to a single closed enum instead
//! of the teacher's const-generic layer count.
//!
//! Derives `serde::{Serialize, Deserialize}` the same way the teacher's own
//! `astarpa2/src/blocks/trace.rs` does on its trace type, so an alignment
//! consumer (SPEC_FULL.md §6) can hand a trace across a process boundary.

/// One maximal run of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SegmentKind {
    /// A run of aligned (match or mismatch) symbol pairs.
    Match,
    /// A run of seqH symbols aligned against a gap (consumes seqH only).
    GapInV,
    /// A run of seqV symbols aligned against a gap (consumes seqV only).
    GapInH,
}

/// One contiguous run of `kind`, anchored at the position in each sequence
/// where the run *starts* (SPEC_FULL.md §3's "trace segment" tuple).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TraceSegment {
    pub seq_h_pos: usize,
    pub seq_v_pos: usize,
    pub length: usize,
    pub kind: SegmentKind,
}

/// An ordered, non-overlapping sequence of trace segments covering one
/// optimal alignment path, delivered start-to-end (seqH/seqV position 0
/// toward the final cell) -- the reverse of the order C5 discovers them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Trace(pub Vec<TraceSegment>);

impl Trace {
    pub fn segments(&self) -> &[TraceSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total aligned columns this trace covers (sum of segment lengths).
    pub fn alignment_length(&self) -> usize {
        self.0.iter().map(|s| s.length).sum()
    }
}

/// Accumulates unit edit steps discovered walking *backward* from the end
/// cell toward the origin, coalescing consecutive same-kind steps into a
/// single segment the way `Cigar::push` does.
///
/// Each unit records the DP cell `(i, j)` the step was taken *from* --
/// `i` the row (seqV index), `j` the column (seqH index), matching
/// [`crate::band::BandGeometry`]'s convention -- and is corrected into
/// start-of-run form once the whole backward walk is reversed into forward
/// order, since a run's start position is only known once its full length
/// is known.
#[derive(Debug, Default)]
pub(crate) struct TraceBuilder {
    // Reverse order: last-discovered-first, i.e. from the end cell back.
    steps: Vec<(SegmentKind, usize, usize)>,
}

impl TraceBuilder {
    /// Records one unit step of `kind` taken from DP cell `(i, j)`.
    pub fn push_unit(&mut self, kind: SegmentKind, i: usize, j: usize) {
        self.steps.push((kind, i, j));
    }

    /// Reverses the backward walk into forward order and coalesces runs of
    /// identical kind into single `TraceSegment`s with summed length.
    ///
    /// A `Match`/`GapInH`/`GapInV` step consumes one or both of (seqH
    /// position `j - 1`, seqV position `i - 1`) depending on kind; the
    /// coordinate a kind does *not* consume stays fixed across an entire
    /// run, so contiguity is checked per-coordinate: the consumed
    /// coordinate must advance by the run's length so far, the unconsumed
    /// one must be unchanged.
    pub fn finish(mut self) -> Trace {
        self.steps.reverse();
        let mut segments: Vec<TraceSegment> = Vec::new();
        for (kind, i, j) in self.steps {
            let (h_pos, v_pos) = match kind {
                SegmentKind::Match => (j - 1, i - 1),
                SegmentKind::GapInV => (j - 1, i),
                SegmentKind::GapInH => (j, i - 1),
            };
            if let Some(last) = segments.last_mut() {
                let h_contig = match kind {
                    SegmentKind::GapInH => last.seq_h_pos == h_pos,
                    _ => last.seq_h_pos + last.length == h_pos,
                };
                let v_contig = match kind {
                    SegmentKind::GapInV => last.seq_v_pos == v_pos,
                    _ => last.seq_v_pos + last.length == v_pos,
                };
                if last.kind == kind && h_contig && v_contig {
                    last.length += 1;
                    continue;
                }
            }
            segments.push(TraceSegment {
                seq_h_pos: h_pos,
                seq_v_pos: v_pos,
                length: 1,
                kind,
            });
        }
        Trace(segments)
    }
}
