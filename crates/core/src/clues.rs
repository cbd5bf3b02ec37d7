//! Clue gating - how many clue reveals a turn earns
//!
//! Every tile category unlocks exactly one clue category. The gate decides
//! only *how many* clues to ask for per matched category per turn; the clue
//! text comes from a [`ClueSource`] supplied by the host.
//!
//! | Longest match of the category | Request |
//! |-------------------------------|---------|
//! | 3 .. large threshold          | 1 clue  |
//! | large .. huge threshold       | `large_match_clues` |
//! | ≥ huge threshold              | every remaining clue |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::{ScoringRules, TurnSummary};
use crate::types::{ClueCategory, TileCategory, CATEGORY_COUNT, MIN_MATCH_LEN};

/// Fixed tile → clue category mapping
pub fn category_for_tile(category: TileCategory) -> ClueCategory {
    category.clue_category()
}

/// How many clues to reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueAmount {
    Count(u32),
    /// Everything still hidden in the category
    All,
}

/// One request to the clue source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClueRequest {
    pub category: ClueCategory,
    pub amount: ClueAmount,
}

/// Clue text handed back by a [`ClueSource`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClueBatch {
    pub clues: Vec<String>,
    /// The category has no clues left after this batch
    pub exhausted: bool,
}

/// Clues revealed for one request, as recorded by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedClues {
    pub category: ClueCategory,
    pub clues: Vec<String>,
    pub exhausted: bool,
}

/// The content side: produces clue text for the current species
pub trait ClueSource {
    fn request_clues(&mut self, category: ClueCategory, amount: ClueAmount) -> ClueBatch;
}

impl<F> ClueSource for F
where
    F: FnMut(ClueCategory, ClueAmount) -> ClueBatch,
{
    fn request_clues(&mut self, category: ClueCategory, amount: ClueAmount) -> ClueBatch {
        self(category, amount)
    }
}

/// Clues shown so far for the current species, per category.
///
/// Owned by the session and reset when a new species comes up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClueProgress {
    per_category: BTreeMap<ClueCategory, u32>,
}

impl SessionClueProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: ClueCategory, revealed: u32) {
        if revealed == 0 {
            return;
        }
        *self.per_category.entry(category).or_insert(0) += revealed;
    }

    pub fn revealed(&self, category: ClueCategory) -> u32 {
        self.per_category.get(&category).copied().unwrap_or(0)
    }

    /// Categories with at least one clue shown
    pub fn revealed_category_count(&self) -> usize {
        self.per_category.values().filter(|n| **n > 0).count()
    }

    pub fn total_revealed(&self) -> u32 {
        self.per_category.values().sum()
    }

    pub fn reset(&mut self) {
        self.per_category.clear();
    }
}

/// Turns matched categories into clue requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueGate {
    large_match_len: usize,
    huge_match_len: usize,
    large_match_clues: u32,
    exhausted: [bool; CATEGORY_COUNT],
}

impl ClueGate {
    /// Thresholds are shared with the scoring rules
    pub fn new(rules: &ScoringRules) -> Self {
        Self {
            large_match_len: rules.large_match_len,
            huge_match_len: rules.huge_match_len,
            large_match_clues: rules.large_match_clues,
            exhausted: [false; CATEGORY_COUNT],
        }
    }

    /// Clues earned by a match of `match_len`; `None` below the match minimum
    pub fn clue_count_for_match(&self, match_len: usize) -> Option<ClueAmount> {
        if match_len < MIN_MATCH_LEN {
            None
        } else if match_len >= self.huge_match_len {
            Some(ClueAmount::All)
        } else if match_len >= self.large_match_len {
            Some(ClueAmount::Count(self.large_match_clues))
        } else {
            Some(ClueAmount::Count(1))
        }
    }

    /// One request per matched, non-exhausted category, sized by the longest
    /// match of that category this turn
    pub fn requests_for_turn(&self, summary: &TurnSummary) -> Vec<ClueRequest> {
        summary
            .categories
            .iter()
            .filter_map(|tile| {
                let category = category_for_tile(tile);
                if self.is_exhausted(category) {
                    return None;
                }
                let amount = self.clue_count_for_match(summary.largest_match_of(tile))?;
                Some(ClueRequest { category, amount })
            })
            .collect()
    }

    pub fn mark_exhausted(&mut self, category: ClueCategory) {
        self.exhausted[category.index()] = true;
    }

    pub fn is_exhausted(&self, category: ClueCategory) -> bool {
        self.exhausted[category.index()]
    }

    /// New species: every category is available again
    pub fn reset(&mut self) {
        self.exhausted = [false; CATEGORY_COUNT];
    }
}

impl Default for ClueGate {
    fn default() -> Self {
        Self::new(&ScoringRules::default())
    }
}
