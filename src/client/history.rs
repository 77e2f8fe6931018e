//! Per-game log of everything the session observed.

use std::sync::Arc;

use crate::client::protocol::GameResult;
use crate::games::penguins::GameState;

/// One observed object.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    State(Arc<GameState>),
    Error(String),
    Result(GameResult),
}

/// Ordered, append-only log with one slot per joined game.
///
/// A slot is opened by every join; entries always go to the newest slot.
#[derive(Debug, Default)]
pub struct SessionHistory {
    games: Vec<Vec<HistoryEntry>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh slot for a new join.
    pub fn start_game(&mut self) {
        self.games.push(Vec::new());
    }

    /// Append to the current slot, opening one if none exists.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.games.is_empty() {
            self.start_game();
        }
        if let Some(current) = self.games.last_mut() {
            current.push(entry);
        }
    }

    /// Entries of the current game.
    pub fn current(&self) -> &[HistoryEntry] {
        self.games.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent snapshot of the current game.
    pub fn last_state(&self) -> Option<&Arc<GameState>> {
        self.current().iter().rev().find_map(|entry| match entry {
            HistoryEntry::State(state) => Some(state),
            _ => None,
        })
    }

    /// Snapshots of the current game in arrival order.
    pub fn states(&self) -> impl Iterator<Item = &Arc<GameState>> + '_ {
        self.current().iter().filter_map(|entry| match entry {
            HistoryEntry::State(state) => Some(state),
            _ => None,
        })
    }

    pub fn games(&self) -> &[Vec<HistoryEntry>] {
        &self.games
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Drop the oldest finished games beyond `retain` and release spare capacity.
    ///
    /// The current slot is never dropped. Returns how many slots were removed.
    pub fn sweep(&mut self, retain: usize) -> usize {
        let finished = self.games.len().saturating_sub(1);
        let excess = finished.saturating_sub(retain);
        if excess > 0 {
            self.games.drain(..excess);
        }
        for game in &mut self.games {
            game.shrink_to_fit();
        }
        self.games.shrink_to_fit();
        excess
    }
}
