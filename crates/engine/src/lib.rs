//! Engine helpers built on top of the core session
//!
//! - [`hint`]: enumerate matching moves, pick the best one, and recover from
//!   dead boards.

pub mod hint;

pub use species_match_core as core;
pub use species_match_types as types;

pub use hint::{
    best_move, candidate_moves, find_moves, hint_for, is_dead_board, reshuffle_if_dead, HintError,
    MoveHint,
};
