//! Grid module - manages the tile grid
//!
//! The grid is a fixed W×H array where each cell is empty or holds a tile.
//! Storage is column-major (`x * height + y`) because every vertical operation
//! (column shifts, gravity compaction, refills) then works on one contiguous slice.
//! Coordinates: (x, y) where x is the column (0 = left) and y the row (0 = top).
//! Gravity pulls toward increasing y.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use arrayvec::ArrayVec;

use crate::rng::{CategoryWeights, TileSpawner};
use crate::types::{
    Cell, Coord, Tile, TileCategory, CATEGORY_COUNT, GENERATION_RETRY_LIMIT, MIN_MATCH_LEN,
};

/// Rejected grid shape when deserializing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have a non-zero size, got {width}x{height}")]
    Empty { width: usize, height: usize },

    #[error("grid of {width}x{height} needs {expected} cells, got {actual}")]
    CellCount {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// The puzzle grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat array of cells, column-major order (x * height + y)
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let RawGrid {
            width,
            height,
            cells,
        } = raw;
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        if width.checked_mul(height) != Some(cells.len()) {
            return Err(GridError::CellCount {
                width,
                height,
                expected: width.saturating_mul(height),
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Fill a new grid using `spawner`, avoiding immediate runs of three.
    ///
    /// Cells are filled column by column, top to bottom; each draw is checked
    /// against the already-placed left and upper neighbours.
    pub fn generate(width: usize, height: usize, spawner: &mut TileSpawner) -> Self {
        let mut grid = Self::new(width, height);
        grid.fill_empty(spawner);
        grid
    }

    /// Build a grid from rows of categories (row 0 first)
    ///
    /// Returns `None` if the rows are ragged or empty.
    pub fn from_rows<R: AsRef<[TileCategory]>>(rows: &[R]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.as_ref().len();
        if width == 0 || rows.iter().any(|r| r.as_ref().len() != width) {
            return None;
        }

        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, category) in row.as_ref().iter().enumerate() {
                grid.set(x, y, Some(Tile::new(*category)));
            }
        }
        Some(grid)
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(x * self.height + y)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Tile at (x, y), flattening out-of-bounds and empty into `None`
    pub fn tile(&self, x: usize, y: usize) -> Option<Tile> {
        self.get(x, y).flatten()
    }

    pub fn category_at(&self, x: usize, y: usize) -> Option<TileCategory> {
        self.tile(x, y).map(|t| t.category)
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// The cells of column `x`, top to bottom
    pub fn column(&self, x: usize) -> Option<&[Cell]> {
        if x >= self.width {
            return None;
        }
        let start = x * self.height;
        Some(&self.cells[start..start + self.height])
    }

    pub fn column_mut(&mut self, x: usize) -> Option<&mut [Cell]> {
        if x >= self.width {
            return None;
        }
        let start = x * self.height;
        Some(&mut self.cells[start..start + self.height])
    }

    /// The cells of row `y`, left to right
    pub fn row(&self, y: usize) -> Option<Vec<Cell>> {
        if y >= self.height {
            return None;
        }
        Some((0..self.width).map(|x| self.cells[x * self.height + y]).collect())
    }

    /// Overwrite row `y` from a slice of exactly `width` cells
    pub fn set_row(&mut self, y: usize, row: &[Cell]) -> bool {
        if y >= self.height || row.len() != self.width {
            return false;
        }
        for (x, cell) in row.iter().enumerate() {
            self.cells[x * self.height + y] = *cell;
        }
        true
    }

    /// True when every cell holds a tile
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Flat column-major cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Would placing `category` at (x, y) complete a run of `MIN_MATCH_LEN`?
    ///
    /// Looks both ways along each axis; empty and out-of-bounds cells end a run.
    pub fn completes_run(&self, x: usize, y: usize, category: TileCategory) -> bool {
        let same = |cx: usize, cy: usize| self.category_at(cx, cy) == Some(category);

        let left = (1..=x).take_while(|d| same(x - d, y)).count();
        let right = (1..self.width.saturating_sub(x))
            .take_while(|d| same(x + d, y))
            .count();
        if left + right + 1 >= MIN_MATCH_LEN {
            return true;
        }

        let up = (1..=y).take_while(|d| same(x, y - d)).count();
        let down = (1..self.height.saturating_sub(y))
            .take_while(|d| same(x, y + d))
            .count();
        up + down + 1 >= MIN_MATCH_LEN
    }

    /// Draw a tile for (x, y) that avoids completing a run where practical.
    ///
    /// A candidate that would complete a run is redrawn with the offending
    /// categories excluded, up to `GENERATION_RETRY_LIMIT` times. When no
    /// alternative is drawable the candidate is accepted as is.
    pub fn draw_tile_for(&self, x: usize, y: usize, spawner: &mut TileSpawner) -> Tile {
        let mut candidate = spawner.draw();
        let mut excluded: ArrayVec<TileCategory, CATEGORY_COUNT> = ArrayVec::new();

        for _ in 0..GENERATION_RETRY_LIMIT {
            if !self.completes_run(x, y, candidate) {
                return Tile::new(candidate);
            }
            if !excluded.contains(&candidate) {
                excluded.push(candidate);
            }
            match spawner.draw_excluding(&excluded) {
                Some(next) => candidate = next,
                None => break,
            }
        }

        if self.completes_run(x, y, candidate) {
            debug!(
                x,
                y,
                category = candidate.as_str(),
                "retry budget exhausted; accepting tile that completes a run"
            );
        }
        Tile::new(candidate)
    }

    /// Fill every empty cell, column by column, top to bottom.
    ///
    /// Returns the spawned tiles in spawn order with their positions.
    pub fn fill_empty(&mut self, spawner: &mut TileSpawner) -> Vec<(Coord, Tile)> {
        let mut spawned = Vec::new();
        for x in 0..self.width {
            let column = self.fill_column(x, spawner);
            spawned.extend(column.into_iter().map(|(y, t)| (Coord::new(x, y), t)));
        }
        spawned
    }

    /// Fill the empty cells of one column top to bottom; returns `(y, tile)` pairs
    pub fn fill_column(&mut self, x: usize, spawner: &mut TileSpawner) -> Vec<(usize, Tile)> {
        let mut spawned = Vec::new();
        for y in 0..self.height {
            if matches!(self.get(x, y), Some(None)) {
                let tile = self.draw_tile_for(x, y, spawner);
                self.set(x, y, Some(tile));
                spawned.push((y, tile));
            }
        }
        spawned
    }

    /// Remove every tile
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}

/// Grid plus the generator that feeds it
///
/// Owns the tile grid for one game location. Changing location regenerates the
/// grid wholesale; changing weights only affects future draws.
#[derive(Debug, Clone)]
pub struct GridModel {
    grid: Grid,
    spawner: TileSpawner,
}

impl GridModel {
    /// Create and fill a `width`×`height` grid
    pub fn new(width: usize, height: usize, seed: u32, weights: Option<CategoryWeights>) -> Self {
        let mut spawner = TileSpawner::new(seed, weights);
        let grid = Grid::generate(width, height, &mut spawner);
        Self { grid, spawner }
    }

    /// Wrap an existing grid; empty cells are filled immediately
    pub fn from_grid(mut grid: Grid, seed: u32, weights: Option<CategoryWeights>) -> Self {
        let mut spawner = TileSpawner::new(seed, weights);
        grid.fill_empty(&mut spawner);
        Self { grid, spawner }
    }

    /// Replace the grid with a freshly generated one using `weights`
    pub fn generate(
        &mut self,
        width: usize,
        height: usize,
        weights: Option<CategoryWeights>,
    ) -> &Grid {
        self.spawner.set_weights(weights);
        self.grid = Grid::generate(width, height, &mut self.spawner);
        &self.grid
    }

    /// Regenerate at the current size with the current weights
    pub fn regenerate(&mut self) -> &Grid {
        let weights = self.spawner.weights().copied();
        self.generate(self.grid.width(), self.grid.height(), weights)
    }

    /// Update weights for future generation and replacement only
    pub fn set_weights(&mut self, weights: Option<CategoryWeights>) {
        self.spawner.set_weights(weights);
    }

    pub fn weights(&self) -> Option<&CategoryWeights> {
        self.spawner.weights()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Split borrow for operations that mutate the grid while drawing tiles
    pub fn parts_mut(&mut self) -> (&mut Grid, &mut TileSpawner) {
        (&mut self.grid, &mut self.spawner)
    }
}
