//! Cascade tests - explode, fall, refill, and whole-turn resolution

use species_match::core::{
    apply_move, find_matches, CascadeResolver, GameConfig, Grid, GridModel, PuzzleSession,
    ScoringEngine, TileSpawner,
};
use species_match::engine::{find_moves, reshuffle_if_dead};
use species_match::types::{Axis, MoveAction, TileCategory::*, BASE_POINTS_PER_TILE};

/// 7×8 grid where shifting row 3 right by two wraps `Red Red` around to
/// meet the `Red` at column 0. All other rows are rotations of the seven
/// non-red categories, so no vertical run is possible.
fn seven_by_eight() -> Grid {
    Grid::from_rows(&[
        [Orange, Yellow, Green, Blue, Purple, Pink, White],
        [Yellow, Green, Blue, Purple, Pink, White, Orange],
        [Green, Blue, Purple, Pink, White, Orange, Yellow],
        [Red, Blue, Green, Yellow, Pink, Red, Red],
        [Blue, Purple, Pink, White, Orange, Yellow, Green],
        [Purple, Pink, White, Orange, Yellow, Green, Blue],
        [Pink, White, Orange, Yellow, Green, Blue, Purple],
        [White, Orange, Yellow, Green, Blue, Purple, Pink],
    ])
    .unwrap()
}

#[test]
fn test_row_shift_single_red_match_scenario() {
    let start = seven_by_eight();
    assert_eq!((start.width(), start.height()), (7, 8));
    assert!(find_matches(&start).is_empty());

    let mut model = GridModel::from_grid(start.clone(), 42, None);
    let (grid, spawner) = model.parts_mut();
    assert!(apply_move(grid, MoveAction::row(3, 2)));

    let matches = find_matches(grid);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].category, Red);
    assert_eq!(matches[0].axis, Axis::Row);
    assert_eq!(matches[0].len(), 3);

    let mut resolver = CascadeResolver::new();
    let phase = resolver.resolve_phase(grid, spawner);
    assert_eq!(phase.matches, matches);
    // One tile removed from each of columns 0..3, one replacement each.
    assert_eq!(phase.tiles_removed(), 3);
    assert_eq!(phase.tiles_spawned(), 3);
    assert_eq!(phase.replacements.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(phase.replacements.values().all(|tiles| tiles.len() == 1));

    // Tiles above the removed row fell by one.
    for x in 0..3 {
        for y in 0..3 {
            assert_eq!(grid.category_at(x, y + 1), start.category_at(x, y));
        }
        assert_eq!(grid.tile(x, 0), Some(phase.replacements[&x][0]));
    }
    // Everything below row 3 is untouched.
    for x in 0..7 {
        for y in 4..8 {
            assert_eq!(grid.category_at(x, y), start.category_at(x, y));
        }
    }

    let engine = ScoringEngine::default();
    assert_eq!(engine.score_phase(&phase), BASE_POINTS_PER_TILE * 3);
}

#[test]
fn test_scenario_through_session() {
    let mut session =
        PuzzleSession::from_grid(GameConfig::with_seed(42), seven_by_eight()).unwrap();

    let preview = session.preview_move(MoveAction::row(3, 2));
    assert_eq!(preview.len(), 1);

    let report = session.apply_move(MoveAction::row(3, 2));
    assert!(report.is_committed());
    assert_eq!(report.phases[0].matches.len(), 1);
    assert_eq!(report.summary.phases, report.phases.len());
    if report.phases.len() == 1 {
        assert_eq!(report.summary.base_score, 30);
        assert_eq!(report.score.final_score, 30);
    }
}

#[test]
fn test_turns_terminate_with_complete_stable_grid() {
    for seed in 0..40 {
        let mut session = PuzzleSession::with_seed(seed).unwrap();
        let cap = session.grid().width() * session.grid().height();

        for _ in 0..6 {
            reshuffle_if_dead(&mut session);
            let Some(hint) = find_moves(session.grid()).into_iter().next() else {
                break;
            };
            let report = session.apply_move(hint.action);
            assert!(report.is_committed(), "seed {}: hinted move snapped back", seed);
            assert!(!report.phases.is_empty());
            assert!(report.phases.len() <= cap);
            assert!(session.grid().is_complete(), "seed {}: grid has gaps", seed);
            assert!(
                find_matches(session.grid()).is_empty(),
                "seed {}: grid left with a match",
                seed
            );
        }
    }
}

#[test]
fn test_resolve_turn_on_stable_grid_is_empty() {
    let mut grid = seven_by_eight();
    let before = grid.clone();
    let mut spawner = TileSpawner::new(1, None);
    let phases = CascadeResolver::new().resolve_turn(&mut grid, &mut spawner);
    assert!(phases.is_empty());
    assert_eq!(grid, before);
}

#[test]
fn test_phase_scores_sum_to_turn_base() {
    let mut grid = Grid::from_rows(&[
        [Red, Red, Red, Blue],
        [Blue, Green, Green, Green],
        [Yellow, Yellow, Yellow, Pink],
        [White, Pink, White, Pink],
    ])
    .unwrap();
    let mut spawner = TileSpawner::new(17, None);
    let engine = ScoringEngine::default();

    let phases = CascadeResolver::new().resolve_turn(&mut grid, &mut spawner);
    assert_eq!(phases[0].matches.len(), 3);
    assert_eq!(engine.score_phase(&phases[0]), 90);

    let total: u32 = phases.iter().map(|p| engine.score_phase(p)).sum();
    assert!(total >= 90);
    for phase in &phases {
        assert_eq!(phase.tiles_removed(), phase.tiles_spawned());
    }
}
