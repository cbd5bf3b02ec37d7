//! Match detection - runs of three or more same-category tiles
//!
//! Rows and columns are scanned independently with a run-length walk. Each run
//! of length ≥ `MIN_MATCH_LEN` is reported once, as a whole; a tile at the
//! crossing of an "L" or "T" therefore shows up in one vertical and one
//! horizontal match.
//!
//! Output order is fixed: vertical runs first in column-major order, then
//! horizontal runs in row-major order.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{Axis, Coord, TileCategory, MIN_MATCH_LEN};

/// A contiguous run of same-category tiles along one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub category: TileCategory,
    /// `Row` for horizontal runs, `Col` for vertical runs
    pub axis: Axis,
    /// Coordinates in scan order (left to right, or top to bottom)
    pub cells: Vec<Coord>,
}

impl Match {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }
}

/// Find every match on `grid`
pub fn find_matches(grid: &Grid) -> Vec<Match> {
    find_matches_by(grid.width(), grid.height(), |x, y| grid.category_at(x, y))
}

/// True if `grid` holds at least one match
pub fn has_matches(grid: &Grid) -> bool {
    !find_matches(grid).is_empty()
}

/// Find matches over any `width`×`height` view.
///
/// `at(x, y)` returns the category at a cell, or `None` for an empty cell
/// (which breaks runs). Used directly by move previews so a hypothetical
/// grid never has to be materialised.
pub fn find_matches_by<F>(width: usize, height: usize, at: F) -> Vec<Match>
where
    F: Fn(usize, usize) -> Option<TileCategory>,
{
    let mut out = Vec::new();

    for x in 0..width {
        scan_line(height, |y| at(x, y), |y| Coord::new(x, y), Axis::Col, &mut out);
    }
    for y in 0..height {
        scan_line(width, |x| at(x, y), |x| Coord::new(x, y), Axis::Row, &mut out);
    }

    out
}

fn scan_line<A, C>(len: usize, at: A, coord: C, axis: Axis, out: &mut Vec<Match>)
where
    A: Fn(usize) -> Option<TileCategory>,
    C: Fn(usize) -> Coord,
{
    let mut start = 0;
    while start < len {
        let Some(category) = at(start) else {
            start += 1;
            continue;
        };

        let mut end = start + 1;
        while end < len && at(end) == Some(category) {
            end += 1;
        }

        if end - start >= MIN_MATCH_LEN {
            out.push(Match {
                category,
                axis,
                cells: (start..end).map(&coord).collect(),
            });
        }

        // Resume after the run: a run is never reported twice on one axis.
        start = end;
    }
}
