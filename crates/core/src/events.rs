//! Game events - an explicit fan-out channel for host collaborators
//!
//! Rendering, session tracking and analytics subscribe with
//! [`EventHub::subscribe`] and drain their `Receiver` at their own pace.
//! The engine only ever writes; a subscriber that dropped its receiver is
//! pruned on the next publish.

use std::sync::mpsc;

use serde::Serialize;

use crate::clues::RevealedClues;
use crate::snapshot::ScoreSnapshot;
use crate::types::ClueCategory;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A committed move and all its cascades finished resolving
    TurnResolved {
        phases: usize,
        base_score: u32,
        final_score: u32,
        multiplier: f64,
        largest_match: usize,
    },
    CluesRevealed(RevealedClues),
    CategoryExhausted {
        category: ClueCategory,
    },
    GuessScored {
        correct: bool,
        bonus: u32,
    },
    /// The grid was regenerated for a new location
    LocationChanged {
        location_id: u32,
        width: usize,
        height: usize,
    },
    /// The grid was regenerated in place (dead board)
    Reshuffled,
    GameOver {
        score: u32,
    },
    Snapshot(ScoreSnapshot),
}

/// Fan-out of [`GameEvent`]s to any number of channel subscribers
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<mpsc::Sender<GameEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber; it sees events published from now on
    pub fn subscribe(&mut self) -> mpsc::Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
