//! Scoring tests - phase points, turn bonuses, streak

use species_match::core::{
    streak_multiplier, ExplodeAndReplacePhase, Match, ScoringEngine, ScoringRules, TurnSummary,
};
use species_match::types::{Axis, Coord, TileCategory, TileCategory::*};

fn phase_with_run(category: TileCategory, len: usize) -> ExplodeAndReplacePhase {
    ExplodeAndReplacePhase {
        matches: vec![Match {
            category,
            axis: Axis::Row,
            cells: (0..len).map(|x| Coord::new(x, 0)).collect(),
        }],
        ..Default::default()
    }
}

fn score_turn(engine: &mut ScoringEngine, phases: &[ExplodeAndReplacePhase]) -> u32 {
    let mut summary = TurnSummary::new();
    for phase in phases {
        summary.record_phase(phase, engine.score_phase(phase));
    }
    engine
        .apply_turn_bonuses(&summary, summary.base_score)
        .final_score
}

#[test]
fn test_longer_match_never_scores_less() {
    for streak_guesses in [0, 1, 3, 10] {
        let mut previous = 0;
        for len in 3..=9 {
            let mut engine = ScoringEngine::default();
            for _ in 0..streak_guesses {
                engine.on_correct_guess(8, 8);
            }
            let score = score_turn(&mut engine, &[phase_with_run(Green, len)]);
            assert!(
                score >= previous,
                "len {} scored {} < {} (streak {})",
                len,
                score,
                previous,
                streak_guesses
            );
            previous = score;
        }
    }
}

#[test]
fn test_wrong_guess_always_resets_multiplier() {
    for streak in 0..20 {
        let mut engine = ScoringEngine::default();
        for _ in 0..streak {
            engine.on_correct_guess(4, 8);
        }
        engine.on_wrong_guess();
        assert_eq!(engine.current_multiplier(), 1.0);
        assert_eq!(engine.state().streak, 0);
    }
}

#[test]
fn test_streak_multiplier_is_capped() {
    let rules = ScoringRules::default();
    let mut last = 0.0;
    for streak in 0..50 {
        let m = streak_multiplier(&rules, streak);
        assert!(m >= last);
        assert!(m <= rules.streak_cap);
        last = m;
    }
    assert_eq!(last, rules.streak_cap);
}

#[test]
fn test_custom_rules_flow_through() {
    let rules = ScoringRules {
        points_per_tile: 7,
        large_match_len: 4,
        large_match_bonus: 3.0,
        ..ScoringRules::default()
    };
    let mut engine = ScoringEngine::new(rules, 10);
    assert_eq!(engine.score_phase(&phase_with_run(Red, 3)), 21);
    assert_eq!(score_turn(&mut engine, &[phase_with_run(Red, 4)]), 84);
}

#[test]
fn test_cascade_phases_accumulate_before_bonuses() {
    let mut engine = ScoringEngine::default();
    let phases = [phase_with_run(Red, 3), phase_with_run(Blue, 3)];
    // 60 base, two categories => x1.25
    assert_eq!(score_turn(&mut engine, &phases), 75);
    assert_eq!(engine.state().score, 75);
}

#[test]
fn test_repeat_category_needs_consecutive_turns() {
    let mut engine = ScoringEngine::default();
    assert_eq!(score_turn(&mut engine, &[phase_with_run(Pink, 3)]), 30);
    assert_eq!(score_turn(&mut engine, &[phase_with_run(White, 3)]), 30);
    // Pink was two turns ago: no repeat bonus
    assert_eq!(score_turn(&mut engine, &[phase_with_run(Pink, 3)]), 30);
    // Pink again right after: x1.1
    assert_eq!(score_turn(&mut engine, &[phase_with_run(Pink, 3)]), 33);
}
