//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the puzzle engine.
//! All types are plain data with no behaviour beyond parsing and display helpers,
//! making them usable in any context (engine, rendering, host integration).
//!
//! # Grid Dimensions
//!
//! The default puzzle grid is 7 columns by 8 rows:
//!
//! - **Width**: 7 columns (indexed 0-6, left to right)
//! - **Height**: 8 rows (indexed 0-7, top to bottom)
//! - **Gravity**: toward increasing row index (tiles fall down)
//!
//! # Match Thresholds
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MATCH_LEN` | 3 | Shortest run that counts as a match |
//! | `LARGE_MATCH_LEN` | 5 | Run length that earns the large-match bonus |
//! | `HUGE_MATCH_LEN` | 6 | Run length that earns the huge-match bonus |
//!
//! The same thresholds gate how many clues a match unlocks.
//!
//! # Examples
//!
//! ```
//! use species_match_types::{Axis, MoveAction, TileCategory, ClueCategory};
//!
//! // Parse from string (case-insensitive)
//! let red = TileCategory::from_str("RED").unwrap();
//! assert_eq!(red, TileCategory::Red);
//!
//! // Every tile category maps onto exactly one clue category
//! assert_eq!(red.clue_category(), ClueCategory::Habitat);
//!
//! // Shift row 3 two cells to the right
//! let action = MoveAction::row(3, 2);
//! assert_eq!(action.axis, Axis::Row);
//! ```

use serde::{Deserialize, Serialize};

/// Default grid width in cells (7 columns)
pub const DEFAULT_GRID_WIDTH: usize = 7;

/// Default grid height in cells (8 rows)
pub const DEFAULT_GRID_HEIGHT: usize = 8;

/// Smallest accepted grid side.
pub const MIN_GRID_SIDE: usize = 3;

/// Largest accepted grid side.
pub const MAX_GRID_SIDE: usize = 64;

/// Number of tile categories (and clue categories)
pub const CATEGORY_COUNT: usize = 8;

/// Shortest run of same-category tiles that forms a match
pub const MIN_MATCH_LEN: usize = 3;

/// Run length at which a match counts as "large"
pub const LARGE_MATCH_LEN: usize = 5;

/// Run length at which a match counts as "huge"
pub const HUGE_MATCH_LEN: usize = 6;

/// Maximum draws per cell before generation accepts a tile that may start a run
pub const GENERATION_RETRY_LIMIT: u32 = 8;

/// Points awarded per tile removed in a phase
pub const BASE_POINTS_PER_TILE: u32 = 10;

/// Streak multiplier increase per consecutive correct guess
pub const STREAK_STEP: f64 = 0.25;

/// Upper bound of the streak multiplier
pub const STREAK_CAP: f64 = 3.0;

/// Turn multiplier when the largest match reaches `LARGE_MATCH_LEN`
pub const LARGE_MATCH_BONUS: f64 = 1.5;

/// Turn multiplier when the largest match reaches `HUGE_MATCH_LEN` (replaces the large bonus)
pub const HUGE_MATCH_BONUS: f64 = 2.0;

/// Turn multiplier when two or more distinct categories matched
pub const MULTI_CATEGORY_BONUS: f64 = 1.25;

/// Turn multiplier when a category matched this turn also matched last turn
pub const REPEAT_CATEGORY_BONUS: f64 = 1.1;

/// Early-guess points per clue category left unrevealed
pub const EARLY_GUESS_POINTS_PER_CATEGORY: u32 = 100;

/// Clues requested for a large (but not huge) match
pub const LARGE_MATCH_CLUES: u32 = 2;

/// Default move budget per location
pub const DEFAULT_MAX_MOVES: u32 = 20;

/// The eight tile categories
///
/// Each category has a gem colour used by renderers and drives one clue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCategory {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    White,
}

impl TileCategory {
    /// All categories in canonical order
    pub const ALL: [TileCategory; CATEGORY_COUNT] = [
        TileCategory::Red,
        TileCategory::Orange,
        TileCategory::Yellow,
        TileCategory::Green,
        TileCategory::Blue,
        TileCategory::Purple,
        TileCategory::Pink,
        TileCategory::White,
    ];

    /// Parse category from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use species_match_types::TileCategory;
    ///
    /// assert_eq!(TileCategory::from_str("red"), Some(TileCategory::Red));
    /// assert_eq!(TileCategory::from_str("Blue"), Some(TileCategory::Blue));
    /// assert_eq!(TileCategory::from_str("mauve"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(TileCategory::Red),
            "orange" => Some(TileCategory::Orange),
            "yellow" => Some(TileCategory::Yellow),
            "green" => Some(TileCategory::Green),
            "blue" => Some(TileCategory::Blue),
            "purple" => Some(TileCategory::Purple),
            "pink" => Some(TileCategory::Pink),
            "white" => Some(TileCategory::White),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileCategory::Red => "red",
            TileCategory::Orange => "orange",
            TileCategory::Yellow => "yellow",
            TileCategory::Green => "green",
            TileCategory::Blue => "blue",
            TileCategory::Purple => "purple",
            TileCategory::Pink => "pink",
            TileCategory::White => "white",
        }
    }

    /// Position in [`TileCategory::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`TileCategory::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Fixed 1:1 mapping onto the clue category this tile unlocks
    pub fn clue_category(self) -> ClueCategory {
        ClueCategory::ALL[self.index()]
    }
}

/// The eight player-facing clue buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueCategory {
    Habitat,
    Diet,
    Appearance,
    Behavior,
    Range,
    Lifespan,
    Conservation,
    Taxonomy,
}

impl ClueCategory {
    /// All clue categories, index-aligned with [`TileCategory::ALL`]
    pub const ALL: [ClueCategory; CATEGORY_COUNT] = [
        ClueCategory::Habitat,
        ClueCategory::Diet,
        ClueCategory::Appearance,
        ClueCategory::Behavior,
        ClueCategory::Range,
        ClueCategory::Lifespan,
        ClueCategory::Conservation,
        ClueCategory::Taxonomy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClueCategory::Habitat => "habitat",
            ClueCategory::Diet => "diet",
            ClueCategory::Appearance => "appearance",
            ClueCategory::Behavior => "behavior",
            ClueCategory::Range => "range",
            ClueCategory::Lifespan => "lifespan",
            ClueCategory::Conservation => "conservation",
            ClueCategory::Taxonomy => "taxonomy",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The tile category that unlocks this clue category
    pub fn tile_category(self) -> TileCategory {
        TileCategory::ALL[self.index()]
    }
}

/// A single tile on the grid
///
/// Tiles are immutable: a matched tile is replaced by a new one, never edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub category: TileCategory,
}

impl Tile {
    pub const fn new(category: TileCategory) -> Self {
        Self { category }
    }
}

impl From<TileCategory> for Tile {
    fn from(category: TileCategory) -> Self {
        Self::new(category)
    }
}

/// A cell on the grid
///
/// - `None`: Empty cell (only transiently, while a phase is resolving)
/// - `Some(Tile)`: Occupied cell
pub type Cell = Option<Tile>;

/// Grid coordinate: `x` is the column (0 = left), `y` the row (0 = top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Which line a move shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Col,
}

impl Axis {
    /// Parse axis from string: "row" | "r", "col" | "column" | "c"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "row" | "r" => Some(Axis::Row),
            "col" | "column" | "c" => Some(Axis::Col),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Col => "col",
        }
    }
}

/// A player move: cyclically shift one row or column
///
/// A positive `amount` moves tiles toward increasing index (right for rows,
/// down for columns). `index` is signed so that edge values coming out of
/// drag-gesture translation can be passed through and clamped to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveAction {
    pub axis: Axis,
    pub index: i32,
    pub amount: i32,
}

impl MoveAction {
    pub const fn row(index: i32, amount: i32) -> Self {
        Self {
            axis: Axis::Row,
            index,
            amount,
        }
    }

    pub const fn col(index: i32, amount: i32) -> Self {
        Self {
            axis: Axis::Col,
            index,
            amount,
        }
    }
}

/// A set of tile categories stored as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CategorySet(u8);

impl CategorySet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a category; returns false if it was already present
    pub fn insert(&mut self, category: TileCategory) -> bool {
        let bit = 1u8 << category.index();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn contains(&self, category: TileCategory) -> bool {
        self.0 & (1u8 << category.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when the two sets share at least one category
    pub fn intersects(&self, other: &CategorySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate members in canonical order
    pub fn iter(&self) -> impl Iterator<Item = TileCategory> + '_ {
        TileCategory::ALL
            .into_iter()
            .filter(move |category| self.contains(*category))
    }
}

impl FromIterator<TileCategory> for CategorySet {
    fn from_iter<I: IntoIterator<Item = TileCategory>>(iter: I) -> Self {
        let mut set = CategorySet::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}
