//! Cascade resolver - explode, fall, refill, repeat
//!
//! One phase removes every matched tile, lets the survivors of each affected
//! column fall toward the bottom, and spawns replacements at the top. A turn
//! repeats phases until a scan finds nothing.
//!
//! Replacement generation tries to avoid new runs but does not guarantee it;
//! a match created by a replacement is simply resolved by the next phase.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::Grid;
use crate::matcher::{find_matches, Match};
use crate::rng::TileSpawner;
use crate::types::{CategorySet, Cell, Coord, Tile};

/// Where the resolver is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverState {
    #[default]
    Idle,
    Resolving,
    Exploding,
    Falling,
}

/// One atomic explode-and-replace step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExplodeAndReplacePhase {
    pub matches: Vec<Match>,
    /// New tiles per column, top to bottom (spawn order)
    pub replacements: BTreeMap<usize, Vec<Tile>>,
}

impl ExplodeAndReplacePhase {
    /// True when the scan found no matches
    pub fn is_nothing_to_do(&self) -> bool {
        self.matches.is_empty()
    }

    /// Distinct matched coordinates (a crossing tile counts once)
    pub fn removed_coords(&self) -> BTreeSet<Coord> {
        self.matches
            .iter()
            .flat_map(|m| m.cells.iter().copied())
            .collect()
    }

    pub fn tiles_removed(&self) -> usize {
        self.removed_coords().len()
    }

    pub fn tiles_spawned(&self) -> usize {
        self.replacements.values().map(Vec::len).sum()
    }

    pub fn largest_match(&self) -> usize {
        self.matches.iter().map(Match::len).max().unwrap_or(0)
    }

    pub fn categories(&self) -> CategorySet {
        self.matches.iter().map(|m| m.category).collect()
    }
}

/// Drives explode/fall/refill phases for one turn at a time
#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    state: ResolverState,
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Resolve a single phase, leaving `grid` in its post-phase state
    pub fn resolve_phase(
        &mut self,
        grid: &mut Grid,
        spawner: &mut TileSpawner,
    ) -> ExplodeAndReplacePhase {
        self.state = ResolverState::Resolving;

        let matches = find_matches(grid);
        if matches.is_empty() {
            self.state = ResolverState::Idle;
            return ExplodeAndReplacePhase::default();
        }

        // Per-column set of matched rows.
        self.state = ResolverState::Exploding;
        let mut removals: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for m in &matches {
            for c in &m.cells {
                removals.entry(c.x).or_default().insert(c.y);
            }
        }
        for (&x, rows) in &removals {
            for &y in rows {
                grid.set(x, y, None);
            }
        }

        // Compact every affected column before refilling any of them, so the
        // anti-match check sees final neighbours.
        self.state = ResolverState::Falling;
        for (&x, rows) in &removals {
            compact_column(grid, x, rows.len());
        }

        let mut replacements = BTreeMap::new();
        for &x in removals.keys() {
            let spawned: Vec<Tile> = grid
                .fill_column(x, spawner)
                .into_iter()
                .map(|(_, tile)| tile)
                .collect();
            replacements.insert(x, spawned);
        }

        let phase = ExplodeAndReplacePhase {
            matches,
            replacements,
        };
        debug!(
            matches = phase.matches.len(),
            removed = phase.tiles_removed(),
            columns = phase.replacements.len(),
            "resolved phase"
        );
        phase
    }

    /// Resolve phases until the grid is stable.
    ///
    /// Stops after `width * height` phases as a guard against a degenerate
    /// generator; in practice turns settle within a handful of phases.
    pub fn resolve_turn(
        &mut self,
        grid: &mut Grid,
        spawner: &mut TileSpawner,
    ) -> Vec<ExplodeAndReplacePhase> {
        let cap = (grid.width() * grid.height()).max(1);
        let mut phases = Vec::new();

        loop {
            let phase = self.resolve_phase(grid, spawner);
            if phase.is_nothing_to_do() {
                break;
            }
            phases.push(phase);
            if phases.len() >= cap {
                warn!(phases = phases.len(), "cascade hit phase cap; ending turn");
                break;
            }
        }

        self.state = ResolverState::Idle;
        phases
    }
}

/// Let the tiles of column `x` fall to the bottom and open `removed` empty
/// cells at the top.
///
/// If the rebuilt column does not come out at the grid height (only possible
/// when the column already had gaps), it is padded or truncated at the top.
fn compact_column(grid: &mut Grid, x: usize, removed: usize) {
    let height = grid.height();
    let Some(column) = grid.column_mut(x) else {
        return;
    };

    let mut rebuilt: Vec<Cell> = Vec::with_capacity(height);
    rebuilt.resize(removed, None);
    rebuilt.extend(column.iter().filter(|c| c.is_some()).copied());

    if rebuilt.len() != height {
        warn!(
            column = x,
            expected = height,
            actual = rebuilt.len(),
            "column length mismatch after explode; correcting"
        );
        if rebuilt.len() < height {
            let pad = height - rebuilt.len();
            rebuilt.splice(0..0, std::iter::repeat(None).take(pad));
        } else {
            let excess = rebuilt.len() - height;
            rebuilt.drain(..excess);
        }
    }

    column.copy_from_slice(&rebuilt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileCategory::*;

    #[test]
    fn test_empty_phase_when_stable() {
        let mut grid = Grid::from_rows(&[[Red, Blue, Red], [Blue, Red, Blue]]).unwrap();
        let before = grid.clone();
        let mut resolver = CascadeResolver::new();
        let mut spawner = TileSpawner::new(1, None);

        let phase = resolver.resolve_phase(&mut grid, &mut spawner);
        assert!(phase.is_nothing_to_do());
        assert!(phase.replacements.is_empty());
        assert_eq!(grid, before);
        assert_eq!(resolver.state(), ResolverState::Idle);
    }

    #[test]
    fn test_survivors_fall_and_column_refills() {
        // Column 0: Pink on top of a vertical Green run.
        let mut grid = Grid::from_rows(&[
            [Pink, Blue],
            [Green, Red],
            [Green, Blue],
            [Green, Red],
        ])
        .unwrap();
        let mut resolver = CascadeResolver::new();
        let mut spawner = TileSpawner::new(3, None);

        let phase = resolver.resolve_phase(&mut grid, &mut spawner);
        assert_eq!(phase.matches.len(), 1);
        assert_eq!(phase.tiles_removed(), 3);
        assert_eq!(phase.replacements.len(), 1);
        assert_eq!(phase.replacements[&0].len(), 3);

        // Pink fell to the bottom; replacements sit above it in spawn order.
        assert_eq!(grid.category_at(0, 3), Some(Pink));
        for (y, tile) in phase.replacements[&0].iter().enumerate() {
            assert_eq!(grid.tile(0, y), Some(*tile));
        }
        assert!(grid.is_complete());
        // Column 1 untouched.
        assert_eq!(grid.category_at(1, 0), Some(Blue));
    }

    #[test]
    fn test_crossing_tile_removed_once() {
        let mut grid = Grid::from_rows(&[
            [Pink, Blue, Green],
            [Pink, Green, Blue],
            [Pink, Pink, Pink],
        ])
        .unwrap();
        let mut resolver = CascadeResolver::new();
        let mut spawner = TileSpawner::new(9, None);

        let phase = resolver.resolve_phase(&mut grid, &mut spawner);
        assert_eq!(phase.matches.len(), 2);
        assert_eq!(phase.tiles_removed(), 5);
        assert_eq!(phase.tiles_spawned(), 5);
        assert_eq!(phase.replacements[&0].len(), 3);
        assert_eq!(phase.replacements[&1].len(), 1);
        assert_eq!(phase.replacements[&2].len(), 1);
    }

    #[test]
    fn test_compact_column_pads_existing_gap() {
        let mut grid = Grid::from_rows(&[[Red], [Blue], [Green], [Pink]]).unwrap();
        // One pre-existing gap plus one "removed" tile.
        grid.set(0, 1, None);
        grid.set(0, 3, None);
        compact_column(&mut grid, 0, 1);

        let column = grid.column(0).unwrap();
        assert_eq!(column.len(), 4);
        assert_eq!(column[0], None);
        assert_eq!(column[1], None);
        assert_eq!(grid.category_at(0, 2), Some(Red));
        assert_eq!(grid.category_at(0, 3), Some(Green));
    }

    #[test]
    fn test_resolve_turn_leaves_stable_complete_grid() {
        let mut grid = Grid::from_rows(&[
            [Red, Red, Red, Blue],
            [Blue, Green, Green, Green],
            [Yellow, Yellow, Yellow, Pink],
            [White, Pink, White, Pink],
        ])
        .unwrap();
        let mut resolver = CascadeResolver::new();
        let mut spawner = TileSpawner::new(42, None);

        let phases = resolver.resolve_turn(&mut grid, &mut spawner);
        assert!(!phases.is_empty());
        assert!(grid.is_complete());
        assert!(find_matches(&grid).is_empty());
        assert_eq!(resolver.state(), ResolverState::Idle);
    }
}
