//! Read-only views of the score and grid for renderers and event consumers

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::scoring::{ScoreState, ScoringEngine};

/// Read-only score view published after every resolved turn
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: u32,
    pub moves_used: u32,
    pub max_moves: u32,
    pub streak: u32,
    pub multiplier: f64,
    pub game_over: bool,
}

impl ScoreSnapshot {
    pub fn from_engine(engine: &ScoringEngine) -> Self {
        let ScoreState {
            streak,
            moves_used,
            max_moves,
            score,
        } = *engine.state();
        Self {
            score,
            moves_used,
            max_moves,
            streak,
            multiplier: engine.current_multiplier(),
            game_over: engine.is_game_over(),
        }
    }

    pub fn moves_remaining(&self) -> u32 {
        self.max_moves.saturating_sub(self.moves_used)
    }
}

/// Grid view for renderers: row-major, 0 = empty, 1..=8 = category index + 1
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<u8>>,
}

impl GridSnapshot {
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = (0..grid.height())
            .map(|y| {
                (0..grid.width())
                    .map(|x| match grid.category_at(x, y) {
                        Some(category) => category.index() as u8 + 1,
                        None => 0,
                    })
                    .collect()
            })
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }

    /// FNV-1a over the dimensions and cell codes; cheap change detection for renderers
    pub fn hash64(&self) -> u64 {
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;

        let mut state = OFFSET;
        for b in (self.width as u64)
            .to_le_bytes()
            .into_iter()
            .chain((self.height as u64).to_le_bytes())
            .chain(self.cells.iter().flatten().copied())
        {
            state ^= b as u64;
            state = state.wrapping_mul(PRIME);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileCategory::*;

    #[test]
    fn grid_snapshot_is_row_major() {
        let mut grid = Grid::from_rows(&[[Red, Blue], [Green, White]]).unwrap();
        grid.set(1, 1, None);
        let snap = GridSnapshot::from_grid(&grid);
        assert_eq!(snap.cells, vec![vec![1, 5], vec![4, 0]]);
    }

    #[test]
    fn grid_snapshot_hash_tracks_content() {
        let a = GridSnapshot::from_grid(&Grid::from_rows(&[[Red, Blue]]).unwrap());
        let b = GridSnapshot::from_grid(&Grid::from_rows(&[[Blue, Red]]).unwrap());
        assert_eq!(a.hash64(), a.clone().hash64());
        assert_ne!(a.hash64(), b.hash64());
    }

    #[test]
    fn grid_snapshot_hash_uses_full_dimensions() {
        let narrow = GridSnapshot {
            width: 1,
            height: 3,
            cells: vec![vec![2], vec![3], vec![4]],
        };
        // 257 truncates to 1 as a byte
        let wide = GridSnapshot {
            width: 257,
            ..narrow.clone()
        };
        let tall = GridSnapshot {
            height: 259,
            ..narrow.clone()
        };
        assert_ne!(narrow.hash64(), wide.hash64());
        assert_ne!(narrow.hash64(), tall.hash64());
    }

    #[test]
    fn score_snapshot_reflects_engine() {
        let mut engine = ScoringEngine::default();
        engine.on_correct_guess(0, 8);
        engine.register_move(true);
        let snap = ScoreSnapshot::from_engine(&engine);
        assert_eq!(snap.streak, 1);
        assert_eq!(snap.moves_used, 1);
        assert_eq!(snap.multiplier, 1.25);
        assert_eq!(snap.score, 800);
        assert!(!snap.game_over);
        assert_eq!(snap.moves_remaining(), snap.max_moves - 1);
    }
}
