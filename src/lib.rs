//! Species Match (workspace facade crate).
//!
//! Re-exports the `species_match::{core,engine,types}` public API; the
//! implementation lives in dedicated crates under `crates/`.

pub use species_match_core as core;
pub use species_match_engine as engine;
pub use species_match_types as types;
