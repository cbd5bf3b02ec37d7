//! Core puzzle logic - pure, deterministic, and testable
//!
//! This crate contains the grid, the move rules, match detection, cascade
//! resolution, scoring and clue gating. It has **no dependencies** on
//! rendering, input or networking, which keeps it:
//!
//! - **Deterministic**: the same seed produces the same grids and refills
//! - **Testable**: every rule is a plain function or a small state machine
//! - **Portable**: runs in a terminal, a GUI host, or headless
//!
//! # Module Structure
//!
//! - [`grid`]: column-major tile grid and the generator that fills it
//! - [`moves`]: cyclic row/column shifts and side-effect-free previews
//! - [`matcher`]: horizontal and vertical runs of three or more
//! - [`cascade`]: explode, fall, refill until the grid is stable
//! - [`scoring`]: phase points, turn bonuses and the discovery streak
//! - [`clues`]: how many clue reveals a turn earns
//! - [`game_state`]: a session tying all of the above together
//! - [`config`], [`events`], [`snapshot`]: host-facing surfaces
//!
//! # Game Rules
//!
//! - A move rotates one full row or column with wrap-around.
//! - A move that would not create a match snaps back and costs nothing.
//! - Matched tiles explode, survivors fall, new tiles drop in from the top,
//!   and the cycle repeats until no runs remain.
//! - Each matched tile category unlocks clues about a hidden species.
//!
//! # Example
//!
//! ```
//! use species_match_core::{GameConfig, PuzzleSession};
//! use species_match_types::MoveAction;
//!
//! let mut session = PuzzleSession::new(GameConfig::with_seed(12345)).unwrap();
//!
//! // Fresh grids never start with a match.
//! assert!(species_match_core::find_matches(session.grid()).is_empty());
//!
//! let report = session.apply_move(MoveAction::row(0, 1));
//! if !report.is_committed() {
//!     // Snapped back: nothing changed, nothing charged.
//!     assert_eq!(session.score_state().moves_used, 0);
//! }
//! ```

pub mod cascade;
pub mod clues;
pub mod config;
pub mod events;
pub mod game_state;
pub mod grid;
pub mod matcher;
pub mod moves;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use species_match_types as types;

// Re-export commonly used types for convenience
pub use cascade::{CascadeResolver, ExplodeAndReplacePhase, ResolverState};
pub use clues::{
    category_for_tile, ClueAmount, ClueBatch, ClueGate, ClueRequest, ClueSource, RevealedClues,
    SessionClueProgress,
};
pub use config::{ConfigError, GameConfig};
pub use events::{EventHub, GameEvent};
pub use game_state::{MoveOutcome, PuzzleSession, TurnReport};
pub use grid::{Grid, GridError, GridModel};
pub use matcher::{find_matches, find_matches_by, has_matches, Match};
pub use moves::{apply_move, effective_shift, preview_matches, preview_move};
pub use rng::{CategoryWeights, SimpleRng, TileSpawner, WeightsError};
pub use scoring::{
    streak_multiplier, ScoreState, ScoringEngine, ScoringRules, TurnScore, TurnSummary,
};
pub use snapshot::{GridSnapshot, ScoreSnapshot};
