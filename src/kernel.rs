//! Cell kernel (component C3): the single-cell recurrence, linear and
//! affine, emitting a score plus a packed direction/state code.
//!
//! Grounded on the Gotoh H/M/D recurrence in
//! `other_examples/1500c71a_..._semiglobal.rs` (`insert_matrix`/
//! `delete_matrix`/`match_matrix`) and the bitmask traceback convention in
//! `other_examples/77d44385_..._algorithm.rs` (`record_optimal_directions`),
//! collapsed to SPEC_FULL.md §4.3's fixed diag > up > left, open > extend
//! tie-break.

use crate::scoring::{Cost, NEG_INF};

/// Packed per-cell code: bits 0-1 select which predecessor realizes `M`,
/// bit 2 marks whether `H` was *opened* here (vs. extended), bit 3 the same
/// for `V`. Unused for the linear kernel (bits 2-3 always clear).
pub type Dir = u8;

pub const DIR_DIAG: Dir = 0b00;
pub const DIR_UP: Dir = 0b01;
pub const DIR_LEFT: Dir = 0b10;
/// Sentinel m-direction meaning "this is a free-end-gap border cell;
/// traceback must stop here without emitting the elided border run."
pub const DIR_STOP: Dir = 0b11;

const M_MASK: Dir = 0b11;
const H_OPEN_BIT: Dir = 1 << 2;
const V_OPEN_BIT: Dir = 1 << 3;

#[inline]
pub fn m_dir(dir: Dir) -> Dir {
    dir & M_MASK
}

#[inline]
pub fn h_opened(dir: Dir) -> bool {
    dir & H_OPEN_BIT != 0
}

#[inline]
pub fn v_opened(dir: Dir) -> bool {
    dir & V_OPEN_BIT != 0
}

#[inline]
fn set_h_open(dir: Dir, open: bool) -> Dir {
    if open {
        dir | H_OPEN_BIT
    } else {
        dir
    }
}

#[inline]
fn set_v_open(dir: Dir, open: bool) -> Dir {
    if open {
        dir | V_OPEN_BIT
    } else {
        dir
    }
}

/// Linear-gap recurrence (SPEC_FULL.md §4.3):
/// `M(i,j) = max(diag + sub, up + gap, left + gap)`.
#[inline]
pub fn step_linear(diag_m: Cost, up_m: Cost, left_m: Cost, sub: Cost, gap: Cost) -> (Cost, Dir) {
    let diag = diag_m.saturating_add(sub);
    let up = up_m.saturating_add(gap);
    let left = left_m.saturating_add(gap);
    if diag >= up && diag >= left {
        (diag, DIR_DIAG)
    } else if up >= left {
        (up, DIR_UP)
    } else {
        (left, DIR_LEFT)
    }
}

/// Gotoh affine recurrence (SPEC_FULL.md §4.3). `up_m`/`up_h` are the `M`/`H`
/// values of predecessor `(i-1, j)`; `left_m`/`left_v` are the `M`/`V`
/// values of predecessor `(i, j-1)`; `diag_m` is the `M` value of
/// `(i-1, j-1)`. Returns `(M, H, V, dir)`.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn step_affine(
    diag_m: Cost,
    up_m: Cost,
    up_h: Cost,
    left_m: Cost,
    left_v: Cost,
    sub: Cost,
    gap_open: Cost,
    gap_extend: Cost,
) -> (Cost, Cost, Cost, Dir) {
    let h_open = up_m.saturating_add(gap_open);
    let h_extend = up_h.saturating_add(gap_extend);
    let (h, h_is_open) = if h_open >= h_extend {
        (h_open, true)
    } else {
        (h_extend, false)
    };

    let v_open = left_m.saturating_add(gap_open);
    let v_extend = left_v.saturating_add(gap_extend);
    let (v, v_is_open) = if v_open >= v_extend {
        (v_open, true)
    } else {
        (v_extend, false)
    };

    let diag = diag_m.saturating_add(sub);
    let (m, mdir) = if diag >= h && diag >= v {
        (diag, DIR_DIAG)
    } else if h >= v {
        (h, DIR_UP)
    } else {
        (v, DIR_LEFT)
    };

    let mut dir = mdir;
    dir = set_h_open(dir, h_is_open);
    dir = set_v_open(dir, v_is_open);
    (m, h, v, dir)
}

/// `NEG_INF` reexported for callers building predecessor triples at the
/// band's off-band edges.
pub const OUT_OF_BAND: Cost = NEG_INF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_prefers_diag_on_ties() {
        let (score, dir) = step_linear(0, 0, 0, 0, 0);
        assert_eq!(score, 0);
        assert_eq!(dir, DIR_DIAG);
    }

    #[test]
    fn linear_prefers_up_over_left_on_ties() {
        let (score, dir) = step_linear(OUT_OF_BAND, 5, 5, -100, 0);
        assert_eq!(score, 5);
        assert_eq!(dir, DIR_UP);
    }

    #[test]
    fn affine_prefers_open_over_extend_on_ties() {
        // up_m + gap_open == up_h + gap_extend
        let (_m, h, _v, dir) = step_affine(OUT_OF_BAND, 0, -1, OUT_OF_BAND, OUT_OF_BAND, -100, -2, -1);
        assert_eq!(h, -2);
        assert!(h_opened(dir) || m_dir(dir) != DIR_UP);
        // Force the up branch to dominate M too, to check the open bit directly.
        let (m, h2, _v2, dir2) = step_affine(-1000, 0, -1, OUT_OF_BAND, OUT_OF_BAND, -1000, -2, -1);
        assert_eq!(m, h2);
        assert_eq!(m_dir(dir2), DIR_UP);
        assert!(h_opened(dir2));
    }

    #[test]
    fn affine_out_of_band_predecessors_never_win() {
        let (m, _h, _v, dir) = step_affine(5, OUT_OF_BAND, OUT_OF_BAND, OUT_OF_BAND, OUT_OF_BAND, 2, -5, -1);
        assert_eq!(m, 7);
        assert_eq!(m_dir(dir), DIR_DIAG);
    }
}
