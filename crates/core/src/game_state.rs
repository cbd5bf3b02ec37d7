//! Game session - ties grid, resolver, scoring and clue gating together
//!
//! A [`PuzzleSession`] owns everything for one player at one location. Moves
//! are previewed before they touch the grid: a move that would match nothing
//! snaps back without costing anything. Committed moves resolve every cascade
//! synchronously, then the turn is scored and clue requests are derived.
//!
//! Host collaborators (renderer, clue content, analytics) observe the session
//! through [`PuzzleSession::subscribe`].

use tracing::{debug, info};

use serde::Serialize;

use crate::cascade::{CascadeResolver, ExplodeAndReplacePhase, ResolverState};
use crate::clues::{ClueGate, ClueRequest, ClueSource, RevealedClues, SessionClueProgress};
use crate::config::{ConfigError, GameConfig};
use crate::events::{EventHub, GameEvent};
use crate::grid::{Grid, GridModel};
use crate::matcher::{find_matches, Match};
use crate::moves::{apply_move, preview_matches};
use crate::rng::CategoryWeights;
use crate::scoring::{ScoreState, ScoringEngine, TurnScore, TurnSummary};
use crate::snapshot::{GridSnapshot, ScoreSnapshot};
use crate::types::{MoveAction, CATEGORY_COUNT};

/// What happened to a submitted move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Committed,
    /// The move would not have matched anything; the grid is unchanged
    NoMatch,
    /// The move budget is spent
    GameOver,
}

/// Result of one submitted move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub action: MoveAction,
    pub outcome: MoveOutcome,
    pub phases: Vec<ExplodeAndReplacePhase>,
    pub summary: TurnSummary,
    pub score: TurnScore,
    /// Clue requests earned this turn; fulfil with [`PuzzleSession::fulfil_clues`]
    pub clue_requests: Vec<ClueRequest>,
    /// Filled in by [`PuzzleSession::play_move`]
    pub revealed: Vec<RevealedClues>,
    pub game_over: bool,
}

impl TurnReport {
    fn rejected(action: MoveAction, outcome: MoveOutcome, game_over: bool) -> Self {
        Self {
            action,
            outcome,
            phases: Vec::new(),
            summary: TurnSummary::default(),
            score: TurnScore::default(),
            clue_requests: Vec::new(),
            revealed: Vec::new(),
            game_over,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.outcome == MoveOutcome::Committed
    }
}

/// One player's game at one location
#[derive(Debug)]
pub struct PuzzleSession {
    config: GameConfig,
    model: GridModel,
    resolver: CascadeResolver,
    scoring: ScoringEngine,
    clue_gate: ClueGate,
    progress: SessionClueProgress,
    events: EventHub,
    location_id: u32,
}

impl PuzzleSession {
    /// Start a session with a freshly generated grid
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = GridModel::new(config.width, config.height, config.seed, config.weights);
        Ok(Self::with_model(config, model))
    }

    /// Default configuration with `seed`
    pub fn with_seed(seed: u32) -> Result<Self, ConfigError> {
        Self::new(GameConfig::with_seed(seed))
    }

    /// Start from a prepared grid; its size overrides the configured one.
    ///
    /// Empty cells are filled from the configured seed. The grid must fit the
    /// size limits and must not already contain a run.
    pub fn from_grid(mut config: GameConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.width = grid.width();
        config.height = grid.height();
        config.validate()?;

        let model = GridModel::from_grid(grid, config.seed, config.weights);
        let runs = find_matches(model.grid());
        if let Some(run) = runs.first() {
            return Err(ConfigError::Invalid(format!(
                "starting grid already contains {} run(s), first a {:?} {:?} run",
                runs.len(),
                run.category,
                run.axis
            )));
        }
        Ok(Self::with_model(config, model))
    }

    fn with_model(config: GameConfig, model: GridModel) -> Self {
        Self {
            scoring: ScoringEngine::new(config.rules, config.max_moves),
            clue_gate: ClueGate::new(&config.rules),
            config,
            model,
            resolver: CascadeResolver::new(),
            progress: SessionClueProgress::new(),
            events: EventHub::new(),
            location_id: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        self.model.grid()
    }

    pub fn score_state(&self) -> &ScoreState {
        self.scoring.state()
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot::from_engine(&self.scoring)
    }

    pub fn grid_snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_grid(self.model.grid())
    }

    pub fn clue_progress(&self) -> &SessionClueProgress {
        &self.progress
    }

    pub fn clue_gate(&self) -> &ClueGate {
        &self.clue_gate
    }

    pub fn resolver_state(&self) -> ResolverState {
        self.resolver.state()
    }

    pub fn location_id(&self) -> u32 {
        self.location_id
    }

    pub fn is_game_over(&self) -> bool {
        self.scoring.is_game_over()
    }

    /// Event stream for a host collaborator
    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Weights for future replacements; the current grid is left as is
    pub fn set_weights(&mut self, weights: Option<CategoryWeights>) {
        self.model.set_weights(weights);
    }

    /// Matches `action` would produce, without touching the grid
    pub fn preview_move(&self, action: MoveAction) -> Vec<Match> {
        preview_matches(self.model.grid(), action)
    }

    /// Submit a move.
    ///
    /// Moves that would not match are rejected untouched and cost nothing.
    /// A committed move resolves all cascades before returning.
    pub fn apply_move(&mut self, action: MoveAction) -> TurnReport {
        if self.is_game_over() {
            debug!(?action, "move rejected: game over");
            return TurnReport::rejected(action, MoveOutcome::GameOver, true);
        }
        if self.preview_move(action).is_empty() {
            debug!(?action, "move rejected: no match");
            return TurnReport::rejected(action, MoveOutcome::NoMatch, false);
        }

        let (grid, spawner) = self.model.parts_mut();
        if !apply_move(grid, action) {
            return TurnReport::rejected(action, MoveOutcome::NoMatch, false);
        }
        let phases = self.resolver.resolve_turn(grid, spawner);

        let mut summary = TurnSummary::new();
        for phase in &phases {
            summary.record_phase(phase, self.scoring.score_phase(phase));
        }
        let score = self.scoring.apply_turn_bonuses(&summary, summary.base_score);
        self.scoring.register_move(summary.any_match);
        let clue_requests = self.clue_gate.requests_for_turn(&summary);
        let game_over = self.is_game_over();

        debug!(
            ?action,
            phases = phases.len(),
            base = summary.base_score,
            final_score = score.final_score,
            "turn resolved"
        );

        self.events.publish(GameEvent::TurnResolved {
            phases: phases.len(),
            base_score: summary.base_score,
            final_score: score.final_score,
            multiplier: score.multiplier,
            largest_match: summary.largest_match,
        });
        self.events.publish(GameEvent::Snapshot(self.snapshot()));
        if game_over {
            let total = self.scoring.state().score;
            info!(score = total, "move budget spent");
            self.events.publish(GameEvent::GameOver { score: total });
        }

        TurnReport {
            action,
            outcome: MoveOutcome::Committed,
            phases,
            summary,
            score,
            clue_requests,
            revealed: Vec::new(),
            game_over,
        }
    }

    /// Ask `source` for the clues in `requests` and record what came back.
    ///
    /// Requests for categories already exhausted are skipped.
    pub fn fulfil_clues<S: ClueSource + ?Sized>(
        &mut self,
        source: &mut S,
        requests: &[ClueRequest],
    ) -> Vec<RevealedClues> {
        let mut revealed = Vec::with_capacity(requests.len());
        for request in requests {
            if self.clue_gate.is_exhausted(request.category) {
                continue;
            }
            let batch = source.request_clues(request.category, request.amount);
            self.progress
                .record(request.category, batch.clues.len() as u32);

            let clues = RevealedClues {
                category: request.category,
                clues: batch.clues,
                exhausted: batch.exhausted,
            };
            self.events.publish(GameEvent::CluesRevealed(clues.clone()));
            if batch.exhausted {
                self.clue_gate.mark_exhausted(request.category);
                self.events.publish(GameEvent::CategoryExhausted {
                    category: request.category,
                });
            }
            revealed.push(clues);
        }
        revealed
    }

    /// [`apply_move`](Self::apply_move) followed by clue fulfilment
    pub fn play_move<S: ClueSource + ?Sized>(
        &mut self,
        action: MoveAction,
        source: &mut S,
    ) -> TurnReport {
        let mut report = self.apply_move(action);
        if report.is_committed() {
            report.revealed = self.fulfil_clues(source, &report.clue_requests);
        }
        report
    }

    /// Score a species guess. A correct guess moves on to a new species, so
    /// clue progress and exhaustion are cleared.
    ///
    /// Returns the bonus awarded (0 for a wrong guess).
    pub fn guess(&mut self, correct: bool) -> u32 {
        let bonus = if correct {
            let revealed = self.progress.revealed_category_count();
            let bonus = self.scoring.on_correct_guess(revealed, CATEGORY_COUNT);
            self.progress.reset();
            self.clue_gate.reset();
            bonus
        } else {
            self.scoring.on_wrong_guess();
            0
        };

        debug!(correct, bonus, streak = self.scoring.state().streak, "guess scored");
        self.events.publish(GameEvent::GuessScored { correct, bonus });
        self.events.publish(GameEvent::Snapshot(self.snapshot()));
        bonus
    }

    /// Move to a new location: regenerate the grid with `weights` and start
    /// a fresh move budget. The running score is kept.
    pub fn change_location(&mut self, weights: Option<CategoryWeights>) {
        self.location_id = self.location_id.wrapping_add(1);
        self.config.weights = weights;
        self.model
            .generate(self.config.width, self.config.height, weights);
        self.scoring.reset_for_location();
        self.progress.reset();
        self.clue_gate.reset();

        info!(
            location = self.location_id,
            width = self.config.width,
            height = self.config.height,
            "location changed"
        );
        self.events.publish(GameEvent::LocationChanged {
            location_id: self.location_id,
            width: self.config.width,
            height: self.config.height,
        });
        self.events.publish(GameEvent::Snapshot(self.snapshot()));
    }

    /// Regenerate the grid in place; score and budget are untouched
    pub fn reshuffle(&mut self) {
        self.model.regenerate();
        debug!("grid reshuffled");
        self.events.publish(GameEvent::Reshuffled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clues::{ClueAmount, ClueBatch};
    use crate::matcher::find_matches;
    use crate::types::{ClueCategory, TileCategory::*};

    // Column 1 shifted down by one brings Red into row 0: R R R R G.
    fn stable_grid() -> Grid {
        Grid::from_rows(&[
            [Red, Blue, Red, Red, Green],
            [Blue, Yellow, Green, Blue, Yellow],
            [Green, Pink, Blue, Yellow, White],
            [Pink, Red, White, Green, Blue],
        ])
        .unwrap()
    }

    fn session(max_moves: u32) -> PuzzleSession {
        let config = GameConfig {
            max_moves,
            ..GameConfig::with_seed(42)
        };
        PuzzleSession::from_grid(config, stable_grid()).unwrap()
    }

    fn one_clue(category: ClueCategory, amount: ClueAmount) -> ClueBatch {
        let n = match amount {
            ClueAmount::Count(n) => n,
            ClueAmount::All => 3,
        };
        ClueBatch {
            clues: (0..n).map(|i| format!("{} #{}", category.as_str(), i)).collect(),
            exhausted: false,
        }
    }

    #[test]
    fn non_matching_move_snaps_back() {
        let mut s = session(5);
        let before = s.grid().clone();

        let report = s.apply_move(MoveAction::row(1, 1));
        assert_eq!(report.outcome, MoveOutcome::NoMatch);
        assert!(report.phases.is_empty());
        assert_eq!(s.grid(), &before);
        assert_eq!(s.score_state().moves_used, 0);
    }

    #[test]
    fn matching_move_commits_and_scores() {
        let mut s = session(5);
        let events = s.subscribe();

        let preview = s.preview_move(MoveAction::col(1, 1));
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].len(), 4);

        let report = s.apply_move(MoveAction::col(1, 1));
        assert!(report.is_committed());
        assert!(!report.phases.is_empty());
        assert_eq!(report.phases[0].matches[0].category, Red);
        assert!(report.score.final_score >= 40);
        assert_eq!(s.score_state().score, report.score.final_score);
        assert_eq!(s.score_state().moves_used, 1);
        assert!(report
            .clue_requests
            .iter()
            .any(|r| r.category == ClueCategory::Habitat));

        assert!(s.grid().is_complete());
        assert!(find_matches(s.grid()).is_empty());
        assert_eq!(s.resolver_state(), ResolverState::Idle);

        let received: Vec<_> = events.try_iter().collect();
        assert!(matches!(received[0], GameEvent::TurnResolved { .. }));
        assert!(matches!(received[1], GameEvent::Snapshot(_)));
    }

    #[test]
    fn moves_after_game_over_are_rejected() {
        let mut s = session(1);
        let events = s.subscribe();
        let report = s.apply_move(MoveAction::col(1, 1));
        assert!(report.game_over);
        assert!(s.is_game_over());
        assert!(events
            .try_iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));

        let grid = s.grid().clone();
        let report = s.apply_move(MoveAction::col(1, 1));
        assert_eq!(report.outcome, MoveOutcome::GameOver);
        assert_eq!(s.grid(), &grid);
    }

    #[test]
    fn play_move_fulfils_requests() {
        let mut s = session(5);
        let mut source = one_clue;
        let report = s.play_move(MoveAction::col(1, 1), &mut source);

        assert_eq!(report.revealed.len(), report.clue_requests.len());
        assert!(s.clue_progress().revealed(ClueCategory::Habitat) >= 1);
    }

    #[test]
    fn exhausted_category_is_not_requested_again() {
        let mut s = session(5);
        let mut source = |category: ClueCategory, _amount: ClueAmount| ClueBatch {
            clues: vec![format!("last {}", category.as_str())],
            exhausted: true,
        };
        let request = ClueRequest {
            category: ClueCategory::Diet,
            amount: ClueAmount::Count(1),
        };

        assert_eq!(s.fulfil_clues(&mut source, &[request]).len(), 1);
        assert!(s.clue_gate().is_exhausted(ClueCategory::Diet));
        assert!(s.fulfil_clues(&mut source, &[request]).is_empty());
        assert_eq!(s.clue_progress().revealed(ClueCategory::Diet), 1);
    }

    #[test]
    fn correct_guess_rewards_unrevealed_categories_and_resets_clues() {
        let mut s = session(5);
        let mut source = one_clue;
        let requests = [
            ClueRequest {
                category: ClueCategory::Habitat,
                amount: ClueAmount::Count(1),
            },
            ClueRequest {
                category: ClueCategory::Diet,
                amount: ClueAmount::Count(1),
            },
        ];
        s.fulfil_clues(&mut source, &requests);

        // 6 unrevealed categories at streak 0
        assert_eq!(s.guess(true), 600);
        assert_eq!(s.score_state().streak, 1);
        assert_eq!(s.clue_progress().total_revealed(), 0);

        // Nothing revealed, streak 1 => 8 * 100 * 1.25
        assert_eq!(s.guess(true), 1000);
        assert_eq!(s.guess(false), 0);
        assert_eq!(s.score_state().streak, 0);
        assert_eq!(s.snapshot().multiplier, 1.0);
    }

    #[test]
    fn change_location_resets_budget_and_keeps_score() {
        let mut s = session(1);
        s.apply_move(MoveAction::col(1, 1));
        let score = s.score_state().score;
        assert!(s.is_game_over());

        let weights = CategoryWeights::from_pairs([(Red, 1.0), (Blue, 1.0), (Green, 1.0)]).unwrap();
        s.change_location(Some(weights));

        assert!(!s.is_game_over());
        assert_eq!(s.location_id(), 1);
        assert_eq!(s.score_state().score, score);
        assert_eq!(s.score_state().moves_used, 0);
        assert!(s.grid().is_complete());
        assert!(s
            .grid()
            .cells()
            .iter()
            .flatten()
            .all(|t| matches!(t.category, Red | Blue | Green)));
    }

    #[test]
    fn reshuffle_keeps_score_state() {
        let mut s = PuzzleSession::with_seed(3).unwrap();
        let events = s.subscribe();
        let state = *s.score_state();
        s.reshuffle();
        assert_eq!(*s.score_state(), state);
        assert!(find_matches(s.grid()).is_empty());
        assert_eq!(events.try_recv(), Ok(GameEvent::Reshuffled));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            width: 1,
            ..GameConfig::default()
        };
        assert!(PuzzleSession::new(config).is_err());
    }

    #[test]
    fn prepared_grid_must_fit_limits_and_be_stable() {
        let single_row = Grid::from_rows(&[[Red, Red, Red, Blue]]).unwrap();
        assert!(matches!(
            PuzzleSession::from_grid(GameConfig::default(), single_row),
            Err(ConfigError::Invalid(_))
        ));

        let too_wide = Grid::new(65, 3);
        assert!(matches!(
            PuzzleSession::from_grid(GameConfig::default(), too_wide),
            Err(ConfigError::Invalid(_))
        ));

        let with_run = Grid::from_rows(&[
            [Red, Red, Red, Blue],
            [Blue, Yellow, Green, Pink],
            [Green, Pink, Blue, Yellow],
        ])
        .unwrap();
        let err = PuzzleSession::from_grid(GameConfig::default(), with_run).unwrap_err();
        assert!(err.to_string().contains("starting grid"));

        let s = PuzzleSession::from_grid(GameConfig::default(), stable_grid()).unwrap();
        assert_eq!((s.config().width, s.config().height), (5, 4));
    }
}
