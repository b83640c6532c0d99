//! Free-end-gap policy (part of C2/C4's boundary configuration).
//!
//! Mirrors the teacher's small plain-struct option bags (e.g. `AstarPaParams`
//! in `src/align.rs`) rather than a builder: every field is public and the
//! default is the all-`false` pure-global case SPEC_FULL.md §4.7 requires.

/// Which matrix borders are "free" (cost nothing) for the purposes of a
/// semi-global alignment. `top`/`left` affect the forward sweep's boundary
/// initialization (C4); `right`/`bottom` only affect which cell traceback
/// starts from (C5) -- see SPEC_FULL.md §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct FreeEndGaps {
    /// A leading gap in seqV (run along row 0) costs nothing.
    pub top: bool,
    /// A leading gap in seqH (run along column 0) costs nothing.
    pub left: bool,
    /// A trailing gap in seqH (alignment may end before consuming all of
    /// seqH) costs nothing; traceback may start anywhere on the last column.
    pub right: bool,
    /// A trailing gap in seqV costs nothing; traceback may start anywhere
    /// on the last row.
    pub bottom: bool,
}

impl FreeEndGaps {
    /// Pure global Needleman-Wunsch / Gotoh: no free end gaps anywhere.
    pub fn global() -> Self {
        Self::default()
    }

    /// All four borders free -- every cell on the opposite border is a
    /// valid start/end point at no extra cost.
    pub fn semi_global() -> Self {
        Self {
            top: true,
            left: true,
            right: true,
            bottom: true,
        }
    }
}
