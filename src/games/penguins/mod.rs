//! Penguins: two teams of four penguins on a hex grid of ice floes.
//!
//! Teams first place their penguins on one-fish floes, then slide them in
//! straight lines along the six hex directions, collecting the fish of the
//! floe they leave.

pub mod board;
pub mod coordinates;
pub mod state;
pub mod types;

pub use board::Board;
pub use coordinates::{Coordinates, Vector, DIRECTIONS};
pub use state::GameState;
pub use types::{Field, Fishes, GameError, Move, Team, PENGUINS_PER_TEAM};
