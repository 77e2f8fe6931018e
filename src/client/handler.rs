//! ClientHandler trait: the decision capability a session drives.

use std::sync::Arc;
use std::time::Duration;

use crate::client::history::SessionHistory;
use crate::client::protocol::GameResult;
use crate::client::session::SessionState;
use crate::games::penguins::{GameState, Move};

/// Pause of the default idle hook between loop iterations.
pub const IDLE_INTERVAL: Duration = Duration::from_millis(250);

/// Read-only view of a session handed to `while_disconnected`.
pub struct SessionStatus<'a> {
    pub state: &'a SessionState,
    pub running: bool,
    pub history: &'a SessionHistory,
}

/// Game logic plugged into a session.
///
/// Only `calculate_move` is required; every notification defaults to a no-op.
pub trait ClientHandler {
    /// Called when the server requests a move. `None` sends nothing.
    fn calculate_move(&mut self) -> Option<Move>;

    /// A new snapshot arrived; always precedes the move request that refers to it.
    fn on_update(&mut self, _state: Arc<GameState>) {}

    fn on_game_over(&mut self, _result: &GameResult) {}

    /// The server reported an error; the session stops right after.
    fn on_error(&mut self, _message: &str) {}

    /// A room message no other hook handles.
    fn on_room_message(&mut self, _payload: &serde_json::Value) {}

    fn on_game_joined(&mut self, _room_id: &str) {}

    /// The server prepared a game and handed out its reservation codes.
    fn on_game_prepared(&mut self, _room_id: &str, _reservations: &[String]) {}

    /// Joined a room as an observer.
    fn on_game_observed(&mut self, _room_id: &str) {}

    /// The server left the room.
    fn on_game_left(&mut self) {}

    /// Called on every loop iteration while no connection is open.
    ///
    /// Return `false` to end the session. The default idles briefly and keeps
    /// the session alive, so a surviving client idles until this returns `false`.
    fn while_disconnected(&mut self, _status: &SessionStatus<'_>) -> bool {
        std::thread::sleep(IDLE_INTERVAL);
        true
    }
}
