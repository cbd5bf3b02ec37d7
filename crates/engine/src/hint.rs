//! Move hints and dead-board recovery

use serde::Serialize;
use tracing::{info, warn};

use crate::core::{preview_matches, Grid, PuzzleSession};
use crate::types::MoveAction;

/// A move that would produce at least one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveHint {
    pub action: MoveAction,
    /// Runs found on the previewed grid
    pub match_count: usize,
    pub largest_match: usize,
    /// Distinct tiles the first phase would remove
    pub tiles_matched: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintError {
    DeadBoard,
    GameOver,
}

impl HintError {
    pub fn code(self) -> &'static str {
        match self {
            HintError::DeadBoard => "dead_board",
            HintError::GameOver => "game_over",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            HintError::DeadBoard => "no row or column shift produces a match",
            HintError::GameOver => "move budget is spent",
        }
    }
}

/// Every distinct non-trivial move: each row and column shifted by
/// `1..len`
pub fn candidate_moves(grid: &Grid) -> Vec<MoveAction> {
    let (w, h) = (grid.width(), grid.height());
    let mut out = Vec::with_capacity(h * w.saturating_sub(1) + w * h.saturating_sub(1));
    for y in 0..h {
        for amount in 1..w {
            out.push(MoveAction::row(y as i32, amount as i32));
        }
    }
    for x in 0..w {
        for amount in 1..h {
            out.push(MoveAction::col(x as i32, amount as i32));
        }
    }
    out
}

/// Every matching move, best first: longest run, then most tiles.
/// Ties keep candidate order (rows before columns).
pub fn find_moves(grid: &Grid) -> Vec<MoveHint> {
    let mut hints: Vec<MoveHint> = candidate_moves(grid)
        .into_iter()
        .filter_map(|action| {
            let matches = preview_matches(grid, action);
            if matches.is_empty() {
                return None;
            }
            let mut cells: Vec<_> = matches
                .iter()
                .flat_map(|m| m.cells.iter().copied())
                .collect();
            cells.sort_unstable();
            cells.dedup();
            Some(MoveHint {
                action,
                match_count: matches.len(),
                largest_match: matches.iter().map(|m| m.len()).max().unwrap_or(0),
                tiles_matched: cells.len(),
            })
        })
        .collect();

    hints.sort_by(|a, b| {
        b.largest_match
            .cmp(&a.largest_match)
            .then(b.tiles_matched.cmp(&a.tiles_matched))
    });
    hints
}

pub fn best_move(grid: &Grid) -> Result<MoveHint, HintError> {
    find_moves(grid)
        .into_iter()
        .next()
        .ok_or(HintError::DeadBoard)
}

/// True when no shift of any row or column would match
pub fn is_dead_board(grid: &Grid) -> bool {
    candidate_moves(grid)
        .into_iter()
        .all(|action| preview_matches(grid, action).is_empty())
}

/// Hint for the session's current grid
pub fn hint_for(session: &PuzzleSession) -> Result<MoveHint, HintError> {
    if session.is_game_over() {
        return Err(HintError::GameOver);
    }
    best_move(session.grid())
}

/// Regenerate the session grid until it has at least one matching move.
///
/// Returns the number of reshuffles performed (0 if the grid was playable).
pub fn reshuffle_if_dead(session: &mut PuzzleSession) -> u32 {
    let limit = session.grid().width() * session.grid().height();
    let mut reshuffles = 0;
    while is_dead_board(session.grid()) && (reshuffles as usize) < limit {
        session.reshuffle();
        reshuffles += 1;
    }
    if is_dead_board(session.grid()) {
        warn!(reshuffles, "board still dead after reshuffle limit");
    } else if reshuffles > 0 {
        info!(reshuffles, "dead board regenerated");
    }
    reshuffles
}
