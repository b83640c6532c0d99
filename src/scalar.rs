//! DP driver, scalar (component C4).
//!
//! Sweeps the band row by row over a rolling two-row buffer (grounded on
//! `src/aligners/front.rs`'s `Front<N, T, I>`/`LEFT_BUFFER`/`RIGHT_BUFFER`
//! convention, generalized from a fixed-offset column window to the
//! diagonal-offset window [`crate::band::BandGeometry`] already provides),
//! applying the free-end-gap boundary policy from SPEC_FULL.md §4.4 and
//! recording a direction matrix when traceback is requested.

use std::cmp::Reverse;

use tracing::trace;

use crate::band::BandGeometry;
use crate::cancellation::CancellationToken;
use crate::config::DEBUG;
use crate::error::AlignError;
use crate::kernel::{self, Dir, DIR_DIAG, DIR_LEFT, DIR_STOP, DIR_UP};
use crate::options::FreeEndGaps;
use crate::scoring::{Cost, Scoring, NEG_INF};

/// Full-band direction bitmap, band-local-indexed: row `i`'s cells occupy
/// `[i * width, (i + 1) * width)`, addressed within that slice via
/// [`BandGeometry::local_index`]. Cells never written by the sweep (because
/// they fall outside that row's valid range) keep their zero-initialized
/// value and are never read back, since traceback only ever visits cells
/// the sweep actually populated.
#[derive(Debug, Clone)]
pub struct DirectionMatrix {
    width: usize,
    data: Vec<Dir>,
}

impl DirectionMatrix {
    fn new(n_rows: usize, width: usize) -> Self {
        Self {
            width,
            data: vec![0; n_rows * width],
        }
    }

    fn set(&mut self, row: usize, local_idx: usize, dir: Dir) {
        self.data[row * self.width + local_idx] = dir;
    }

    pub fn get(&self, band: &BandGeometry, i: usize, j: usize) -> Option<Dir> {
        let idx = band.local_index(i, j)?;
        Some(self.data[i * self.width + idx])
    }
}

/// The `M` scores collected along the borders traceback (C5) may start
/// from, plus the score at the configured end corner `(n, m)` itself.
#[derive(Debug, Clone)]
pub struct ForwardScores {
    /// `(j, M(n, j))` for every `j` in the band's last row.
    pub last_row: Vec<(usize, Cost)>,
    /// `(i, M(i, m))` for every `i` whose row includes the last column.
    pub last_col: Vec<(usize, Cost)>,
    /// `M(n, m)`, guaranteed present since the band must reach the end cell.
    pub corner: Cost,
}

#[derive(Debug, Clone)]
pub struct ScalarForward {
    pub scores: ForwardScores,
    pub directions: Option<DirectionMatrix>,
}

#[inline]
fn pred(buf: &[Cost], band: &BandGeometry, i: usize, j: usize) -> Cost {
    match band.local_index(i, j) {
        Some(idx) if idx < buf.len() => buf[idx],
        _ => NEG_INF,
    }
}

#[inline]
fn pred_pair(buf: &[(Cost, Cost, Cost)], band: &BandGeometry, i: usize, j: usize) -> (Cost, Cost, Cost) {
    match band.local_index(i, j) {
        Some(idx) if idx < buf.len() => buf[idx],
        _ => (NEG_INF, NEG_INF, NEG_INF),
    }
}

/// Scalar forward sweep for the linear gap model.
pub fn sweep_linear(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    band: &BandGeometry,
    want_trace: bool,
    cancel: &CancellationToken,
) -> Result<ScalarForward, AlignError> {
    let m = band.m();
    let n = band.n();
    let width = band.width();
    let gap = scoring.gap_extend();

    let mut prev = vec![NEG_INF; width];
    let mut cur = vec![NEG_INF; width];
    let mut directions = want_trace.then(|| DirectionMatrix::new(n + 1, width));
    let mut last_col: Vec<(usize, Cost)> = Vec::new();
    let mut last_row: Vec<(usize, Cost)> = Vec::new();

    let (lo0, hi0) = band.row_range(0);
    for j in lo0..=hi0 {
        let idx = band.local_index(0, j).unwrap();
        let (val, dir) = if j == 0 {
            (0, DIR_DIAG)
        } else if flags.top {
            (0, DIR_STOP)
        } else {
            (j as Cost * gap, DIR_LEFT)
        };
        cur[idx] = val;
        if let Some(dm) = directions.as_mut() {
            dm.set(0, idx, dir);
        }
    }
    if let Some(idx) = band.local_index(0, m) {
        last_col.push((0, cur[idx]));
    }
    if n == 0 {
        last_row = (lo0..=hi0).map(|j| (j, cur[band.local_index(0, j).unwrap()])).collect();
    }

    std::mem::swap(&mut prev, &mut cur);

    for i in 1..=n {
        if cancel.is_cancelled() {
            return Err(AlignError::Cancelled);
        }
        if DEBUG {
            trace!(i, "scalar linear sweep row");
        }
        cur.iter_mut().for_each(|c| *c = NEG_INF);
        let (lo, hi) = band.row_range(i);
        for j in lo..=hi {
            let idx = band.local_index(i, j).unwrap();
            if j == 0 {
                let (val, dir) = if flags.left {
                    (0, DIR_STOP)
                } else {
                    (i as Cost * gap, DIR_UP)
                };
                cur[idx] = val;
                if let Some(dm) = directions.as_mut() {
                    dm.set(i, idx, dir);
                }
                continue;
            }
            let diag = pred(&prev, band, i - 1, j - 1);
            let up = pred(&prev, band, i - 1, j);
            let left = cur[band.local_index(i, j - 1).unwrap()];
            let sub = scoring.substitution(seq_h[j - 1], seq_v[i - 1]);
            let (val, dir) = kernel::step_linear(diag, up, left, sub, gap);
            cur[idx] = val;
            if let Some(dm) = directions.as_mut() {
                dm.set(i, idx, dir);
            }
        }
        if let Some(idx) = band.local_index(i, m) {
            last_col.push((i, cur[idx]));
        }
        if i == n {
            last_row = (lo..=hi).map(|j| (j, cur[band.local_index(i, j).unwrap()])).collect();
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let corner = corner_value(m, n, &last_row, &last_col);
    Ok(ScalarForward {
        scores: ForwardScores { last_row, last_col, corner },
        directions,
    })
}

/// Scalar forward sweep for the affine (Gotoh) gap model.
pub fn sweep_affine(
    seq_h: &[u8],
    seq_v: &[u8],
    scoring: &dyn Scoring,
    flags: FreeEndGaps,
    band: &BandGeometry,
    want_trace: bool,
    cancel: &CancellationToken,
) -> Result<ScalarForward, AlignError> {
    let m = band.m();
    let n = band.n();
    let width = band.width();
    let gap_open = scoring.gap_open();
    let gap_extend = scoring.gap_extend();

    let mut prev = vec![(NEG_INF, NEG_INF, NEG_INF); width];
    let mut cur = vec![(NEG_INF, NEG_INF, NEG_INF); width];
    let mut directions = want_trace.then(|| DirectionMatrix::new(n + 1, width));
    let mut last_col: Vec<(usize, Cost)> = Vec::new();
    let mut last_row: Vec<(usize, Cost)> = Vec::new();

    let (lo0, hi0) = band.row_range(0);
    for j in lo0..=hi0 {
        let idx = band.local_index(0, j).unwrap();
        if j == 0 {
            cur[idx] = (0, NEG_INF, NEG_INF);
            if let Some(dm) = directions.as_mut() {
                dm.set(0, idx, DIR_DIAG);
            }
            continue;
        }
        // V(0, j) is always the real Gotoh gap-run chain along row 0; only
        // the *M*-level label differs with `flags.top` (SPEC_FULL.md §4.4).
        let left_v = cur[band.local_index(0, j - 1).unwrap()].2;
        let left_m = cur[band.local_index(0, j - 1).unwrap()].0;
        let v_open_score = left_m.saturating_add(gap_open);
        let v_extend_score = left_v.saturating_add(gap_extend);
        let (v, is_open) = if v_open_score >= v_extend_score {
            (v_open_score, true)
        } else {
            (v_extend_score, false)
        };
        let m_val = if flags.top { 0 } else { v };
        cur[idx] = (m_val, NEG_INF, v);
        if let Some(dm) = directions.as_mut() {
            let mut dir = if flags.top { DIR_STOP } else { DIR_LEFT };
            if is_open {
                dir |= 1 << 3;
            }
            dm.set(0, idx, dir);
        }
    }
    if let Some(idx) = band.local_index(0, m) {
        last_col.push((0, cur[idx].0));
    }
    if n == 0 {
        last_row = (lo0..=hi0).map(|j| (j, cur[band.local_index(0, j).unwrap()].0)).collect();
    }

    std::mem::swap(&mut prev, &mut cur);

    for i in 1..=n {
        if cancel.is_cancelled() {
            return Err(AlignError::Cancelled);
        }
        if DEBUG {
            trace!(i, "scalar affine sweep row");
        }
        cur.iter_mut().for_each(|c| *c = (NEG_INF, NEG_INF, NEG_INF));
        let (lo, hi) = band.row_range(i);
        for j in lo..=hi {
            let idx = band.local_index(i, j).unwrap();
            if j == 0 {
                let (up_m, up_h, _) = pred_pair(&prev, band, i - 1, 0);
                let h_open_score = up_m.saturating_add(gap_open);
                let h_extend_score = up_h.saturating_add(gap_extend);
                let (h, is_open) = if h_open_score >= h_extend_score {
                    (h_open_score, true)
                } else {
                    (h_extend_score, false)
                };
                let m_val = if flags.left { 0 } else { h };
                cur[idx] = (m_val, h, NEG_INF);
                if let Some(dm) = directions.as_mut() {
                    let mut dir = if flags.left { DIR_STOP } else { DIR_UP };
                    if is_open {
                        dir |= 1 << 2;
                    }
                    dm.set(i, idx, dir);
                }
                continue;
            }
            let diag_m = pred_pair(&prev, band, i - 1, j - 1).0;
            let (up_m, up_h, _) = pred_pair(&prev, band, i - 1, j);
            let (left_m, _, left_v) = cur[band.local_index(i, j - 1).unwrap()];
            let sub = scoring.substitution(seq_h[j - 1], seq_v[i - 1]);
            let (mv, hv, vv, dir) =
                kernel::step_affine(diag_m, up_m, up_h, left_m, left_v, sub, gap_open, gap_extend);
            cur[idx] = (mv, hv, vv);
            if let Some(dm) = directions.as_mut() {
                dm.set(i, idx, dir);
            }
        }
        if let Some(idx) = band.local_index(i, m) {
            last_col.push((i, cur[idx].0));
        }
        if i == n {
            last_row = (lo..=hi).map(|j| (j, cur[band.local_index(i, j).unwrap()].0)).collect();
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let corner = corner_value(m, n, &last_row, &last_col);
    Ok(ScalarForward {
        scores: ForwardScores { last_row, last_col, corner },
        directions,
    })
}

fn corner_value(m: usize, n: usize, last_row: &[(usize, Cost)], last_col: &[(usize, Cost)]) -> Cost {
    last_row
        .iter()
        .find(|&&(j, _)| j == m)
        .map(|&(_, v)| v)
        .or_else(|| last_col.iter().find(|&&(i, _)| i == n).map(|&(_, v)| v))
        .expect("band validity guarantees the end cell (n, m) was computed")
}

/// Chooses the traceback start/score-extraction cell (C5's first
/// responsibility, shared with the score-only path): SPEC_FULL.md §4.5.
pub fn select_end_cell(m: usize, n: usize, flags: FreeEndGaps, scores: &ForwardScores) -> (usize, usize, Cost) {
    let mut candidates: Vec<(usize, usize, Cost)> = Vec::new();
    if flags.bottom {
        candidates.extend(scores.last_row.iter().map(|&(j, v)| (n, j, v)));
    }
    if flags.right {
        candidates.extend(scores.last_col.iter().map(|&(i, v)| (i, m, v)));
    }
    if candidates.is_empty() {
        return (n, m, scores.corner);
    }
    candidates
        .into_iter()
        .max_by_key(|&(i, j, score)| {
            let dist = ((m as i64 - j as i64) + (n as i64 - i as i64)).abs();
            (score, Reverse(dist), i, j)
        })
        .expect("candidates is non-empty")
}
