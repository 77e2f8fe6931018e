//! Built-in decision logics.

use std::cmp::Reverse;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::client::handler::ClientHandler;
use crate::client::protocol::GameResult;
use crate::games::penguins::{Field, GameState, Move};

/// Picks a uniformly random move, preferring destinations a penguin can enter.
pub struct RandomLogic {
    rng: StdRng,
    state: Option<Arc<GameState>>,
}

impl RandomLogic {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            state: None,
        }
    }

    /// Reproducible choices for a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            state: None,
        }
    }

    pub fn state(&self) -> Option<&Arc<GameState>> {
        self.state.as_ref()
    }
}

impl Default for RandomLogic {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientHandler for RandomLogic {
    fn calculate_move(&mut self) -> Option<Move> {
        let state = self.state.as_ref()?;
        let moves = state.possible_moves();
        let board = state.board();
        let enterable: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|m| board.can_enter(m.to))
            .collect();
        let candidates = if enterable.is_empty() {
            &moves
        } else {
            &enterable
        };
        candidates.choose(&mut self.rng).copied()
    }

    fn on_update(&mut self, state: Arc<GameState>) {
        self.state = Some(state);
    }

    fn on_game_over(&mut self, result: &GameResult) {
        tracing::info!(winner = ?result.winner, reason = ?result.reason, "game ended");
    }
}

/// Always moves to the destination with the most fish.
#[derive(Default)]
pub struct GreedyLogic {
    state: Option<Arc<GameState>>,
}

impl GreedyLogic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientHandler for GreedyLogic {
    fn calculate_move(&mut self) -> Option<Move> {
        let state = self.state.as_ref()?;
        let board = state.board();
        // min_by_key keeps the first of equal keys, so ties go to generation order
        let moves = state.possible_moves();
        moves.into_iter().min_by_key(|m| {
            let fish = board.get_field_or_none(m.to).and_then(Field::fish);
            Reverse(fish.unwrap_or(0))
        })
    }

    fn on_update(&mut self, state: Arc<GameState>) {
        self.state = Some(state);
    }

    fn on_game_over(&mut self, result: &GameResult) {
        tracing::info!(winner = ?result.winner, reason = ?result.reason, "game ended");
    }
}
