//! Scoring module - phase points, turn bonuses and the discovery streak
//!
//! Scoring happens in two steps:
//! - every resolved phase earns base points per tile removed;
//! - once the whole turn (move plus cascades) has resolved, the summed base
//!   score is multiplied by the turn bonuses.
//!
//! Turn bonuses are independent scalar multipliers, so their order does not
//! matter:
//! - large match (≥ `large_match_len`) or huge match (≥ `huge_match_len`,
//!   replaces the large bonus);
//! - two or more distinct categories matched this turn;
//! - a category matched this turn was also matched the turn before.
//!
//! The streak counts consecutive correct guesses. It scales the early-guess
//! bonus through `min(1 + streak * step, cap)` and is reset by a wrong guess.

use serde::{Deserialize, Serialize};

use crate::cascade::ExplodeAndReplacePhase;
use crate::types::{
    CategorySet, TileCategory, BASE_POINTS_PER_TILE, CATEGORY_COUNT, DEFAULT_MAX_MOVES,
    EARLY_GUESS_POINTS_PER_CATEGORY, HUGE_MATCH_BONUS, HUGE_MATCH_LEN, LARGE_MATCH_BONUS,
    LARGE_MATCH_CLUES, LARGE_MATCH_LEN, MULTI_CATEGORY_BONUS, REPEAT_CATEGORY_BONUS, STREAK_CAP,
    STREAK_STEP,
};

/// Tunable scoring and clue-gating parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub points_per_tile: u32,
    pub streak_step: f64,
    pub streak_cap: f64,
    pub large_match_len: usize,
    pub huge_match_len: usize,
    pub large_match_bonus: f64,
    pub huge_match_bonus: f64,
    pub multi_category_bonus: f64,
    pub repeat_category_bonus: f64,
    pub early_guess_points: u32,
    /// Clues requested for a large (not huge) match
    pub large_match_clues: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_per_tile: BASE_POINTS_PER_TILE,
            streak_step: STREAK_STEP,
            streak_cap: STREAK_CAP,
            large_match_len: LARGE_MATCH_LEN,
            huge_match_len: HUGE_MATCH_LEN,
            large_match_bonus: LARGE_MATCH_BONUS,
            huge_match_bonus: HUGE_MATCH_BONUS,
            multi_category_bonus: MULTI_CATEGORY_BONUS,
            repeat_category_bonus: REPEAT_CATEGORY_BONUS,
            early_guess_points: EARLY_GUESS_POINTS_PER_CATEGORY,
            large_match_clues: LARGE_MATCH_CLUES,
        }
    }
}

/// Streak multiplier: `min(1 + streak * step, cap)`
pub fn streak_multiplier(rules: &ScoringRules, streak: u32) -> f64 {
    (1.0 + streak as f64 * rules.streak_step).min(rules.streak_cap)
}

/// Running totals for one player move and all of its cascades
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub base_score: u32,
    pub largest_match: usize,
    pub categories: CategorySet,
    /// Explode/replace phases in the turn, the initial one included
    pub phases: usize,
    pub any_match: bool,
    largest_by_category: [usize; CATEGORY_COUNT],
}

impl TurnSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one resolved phase and its base points into the totals
    pub fn record_phase(&mut self, phase: &ExplodeAndReplacePhase, phase_score: u32) {
        if phase.is_nothing_to_do() {
            return;
        }
        self.any_match = true;
        self.phases += 1;
        self.base_score = self.base_score.saturating_add(phase_score);
        for m in &phase.matches {
            self.categories.insert(m.category);
            self.largest_match = self.largest_match.max(m.len());
            let slot = &mut self.largest_by_category[m.category.index()];
            *slot = (*slot).max(m.len());
        }
    }

    /// Longest match of `category` this turn (0 if it did not match)
    pub fn largest_match_of(&self, category: TileCategory) -> usize {
        self.largest_by_category[category.index()]
    }

    /// Phases after the one triggered directly by the move
    pub fn cascades(&self) -> usize {
        self.phases.saturating_sub(1)
    }
}

/// Score and multiplier for a finished turn
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnScore {
    pub final_score: u32,
    pub multiplier: f64,
}

/// Score counters owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub streak: u32,
    pub moves_used: u32,
    pub max_moves: u32,
    pub score: u32,
}

/// Converts phases and guesses into score
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rules: ScoringRules,
    state: ScoreState,
    previous_categories: CategorySet,
}

impl ScoringEngine {
    pub fn new(rules: ScoringRules, max_moves: u32) -> Self {
        Self {
            rules,
            state: ScoreState {
                max_moves,
                ..ScoreState::default()
            },
            previous_categories: CategorySet::new(),
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    /// Multiplier for an arbitrary streak under these rules
    pub fn multiplier_for(&self, streak: u32) -> f64 {
        streak_multiplier(&self.rules, streak)
    }

    /// Multiplier for the current streak
    pub fn current_multiplier(&self) -> f64 {
        self.multiplier_for(self.state.streak)
    }

    /// Base points for one phase: linear in distinct tiles removed
    pub fn score_phase(&self, phase: &ExplodeAndReplacePhase) -> u32 {
        (phase.tiles_removed() as u32).saturating_mul(self.rules.points_per_tile)
    }

    /// Product of every turn bonus that applies to `summary`
    pub fn turn_multiplier(&self, summary: &TurnSummary) -> f64 {
        let mut multiplier = 1.0;

        if summary.largest_match >= self.rules.huge_match_len {
            multiplier *= self.rules.huge_match_bonus;
        } else if summary.largest_match >= self.rules.large_match_len {
            multiplier *= self.rules.large_match_bonus;
        }

        if summary.categories.len() >= 2 {
            multiplier *= self.rules.multi_category_bonus;
        }

        if summary.categories.intersects(&self.previous_categories) {
            multiplier *= self.rules.repeat_category_bonus;
        }

        multiplier
    }

    /// Apply turn bonuses to `base_score`, add the result to the running score,
    /// and remember this turn's categories for the next repeat check.
    pub fn apply_turn_bonuses(&mut self, summary: &TurnSummary, base_score: u32) -> TurnScore {
        let multiplier = self.turn_multiplier(summary);
        let final_score = (base_score as f64 * multiplier).round() as u32;

        self.state.score = self.state.score.saturating_add(final_score);
        self.previous_categories = summary.categories;

        TurnScore {
            final_score,
            multiplier,
        }
    }

    /// Reward a correct guess made before every clue category was revealed.
    ///
    /// Returns the bonus (already added to the score) and extends the streak.
    pub fn on_correct_guess(&mut self, revealed_categories: usize, total_categories: usize) -> u32 {
        let unrevealed = total_categories.saturating_sub(revealed_categories) as f64;
        let bonus = (unrevealed * self.rules.early_guess_points as f64 * self.current_multiplier())
            .round() as u32;

        self.state.score = self.state.score.saturating_add(bonus);
        self.state.streak = self.state.streak.saturating_add(1);
        bonus
    }

    pub fn on_wrong_guess(&mut self) {
        self.state.streak = 0;
    }

    /// Count a move against the budget; only moves that matched cost anything.
    ///
    /// Returns whether the move was counted.
    pub fn register_move(&mut self, produced_match: bool) -> bool {
        if !produced_match {
            return false;
        }
        self.state.moves_used = self.state.moves_used.saturating_add(1);
        true
    }

    pub fn moves_remaining(&self) -> u32 {
        self.state.max_moves.saturating_sub(self.state.moves_used)
    }

    pub fn is_game_over(&self) -> bool {
        self.state.moves_used >= self.state.max_moves
    }

    /// New location: clear streak, move counter and repeat-category memory
    pub fn reset_for_location(&mut self) {
        self.state.streak = 0;
        self.state.moves_used = 0;
        self.previous_categories.clear();
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringRules::default(), DEFAULT_MAX_MOVES)
    }
}
