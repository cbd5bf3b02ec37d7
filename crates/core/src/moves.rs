//! Move engine - cyclic row and column shifts
//!
//! A move rotates one whole row or column with wrap-around. Amounts are
//! normalised modulo the line length, so any multiple of the length is a
//! no-op. Out-of-range indices are clamped to a no-op as well: drag
//! gestures routinely produce edge values and they are not errors.

use crate::grid::Grid;
use crate::matcher::{find_matches_by, Match};
use crate::types::{Axis, MoveAction, TileCategory};

/// Normalise a signed shift into `[0, len)`
pub fn effective_shift(amount: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (amount as i64).rem_euclid(len as i64) as usize
}

/// Resolve `action` against `grid`: the line index and non-zero shift, or
/// `None` when the move does nothing
fn resolve(grid: &Grid, action: MoveAction) -> Option<(usize, usize)> {
    let (lines, len) = match action.axis {
        Axis::Row => (grid.height(), grid.width()),
        Axis::Col => (grid.width(), grid.height()),
    };
    if action.index < 0 || action.index as usize >= lines {
        return None;
    }
    let shift = effective_shift(action.amount, len);
    if shift == 0 {
        return None;
    }
    Some((action.index as usize, shift))
}

/// Apply `action` to `grid` in place.
///
/// Returns false when the move was a no-op (out-of-range index or zero
/// effective shift).
pub fn apply_move(grid: &mut Grid, action: MoveAction) -> bool {
    let Some((index, shift)) = resolve(grid, action) else {
        return false;
    };

    match action.axis {
        Axis::Row => {
            let Some(mut row) = grid.row(index) else {
                return false;
            };
            row.rotate_right(shift);
            grid.set_row(index, &row)
        }
        Axis::Col => match grid.column_mut(index) {
            Some(column) => {
                column.rotate_right(shift);
                true
            }
            None => false,
        },
    }
}

/// A copy of `grid` with `action` applied; `grid` is left untouched
pub fn preview_move(grid: &Grid, action: MoveAction) -> Grid {
    let mut preview = grid.clone();
    apply_move(&mut preview, action);
    preview
}

/// Category at (x, y) as it would be after `action`, without building the grid
pub fn shifted_category_at(
    grid: &Grid,
    action: MoveAction,
    x: usize,
    y: usize,
) -> Option<TileCategory> {
    let Some((index, shift)) = resolve(grid, action) else {
        return grid.category_at(x, y);
    };

    match action.axis {
        Axis::Row if y == index => {
            let w = grid.width();
            grid.category_at((x + w - shift) % w, y)
        }
        Axis::Col if x == index => {
            let h = grid.height();
            grid.category_at(x, (y + h - shift) % h)
        }
        _ => grid.category_at(x, y),
    }
}

/// Matches `action` would produce, computed as a pure function of `grid`.
///
/// This is what an input layer asks before committing a drag: an empty
/// result means "snap back".
pub fn preview_matches(grid: &Grid, action: MoveAction) -> Vec<Match> {
    if resolve(grid, action).is_none() {
        return Vec::new();
    }
    find_matches_by(grid.width(), grid.height(), |x, y| {
        shifted_category_at(grid, action, x, y)
    })
}
