//! Immutable per-turn game snapshot and legal-move generation.

use std::sync::Arc;

use super::board::Board;
use super::coordinates::Coordinates;
use super::types::{Fishes, Move, Team, PENGUINS_PER_TEAM};

/// Everything known about the game between two moves.
///
/// The turn counter drives who moves next: on even turns the start team is
/// to move, on odd turns its opponent. Snapshots are never mutated; each
/// server update produces a new one. The board sits behind an `Arc` so a
/// snapshot built from a partial update can share it with its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Arc<Board>,
    turn: u32,
    start_team: Team,
    fishes: Fishes,
    last_move: Option<Move>,
    current_pieces: Vec<Coordinates>,
}

impl GameState {
    pub fn new(
        board: impl Into<Arc<Board>>,
        turn: u32,
        start_team: Team,
        fishes: Fishes,
        last_move: Option<Move>,
    ) -> Self {
        let board = board.into();
        let current_team = current_team_for(start_team, turn);
        let current_pieces = board.team_penguins(current_team);
        Self {
            board,
            turn,
            start_team,
            fishes,
            last_move,
            current_pieces,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Shared handle to the board, for building follow-up snapshots.
    pub fn shared_board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn round(&self) -> u32 {
        (self.turn + 1) / 2
    }

    pub fn start_team(&self) -> Team {
        self.start_team
    }

    pub fn current_team(&self) -> Team {
        current_team_for(self.start_team, self.turn)
    }

    pub fn other_team(&self) -> Team {
        self.current_team().opponent()
    }

    pub fn fishes(&self) -> Fishes {
        self.fishes
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    /// Double-hex positions of the current team's penguins.
    pub fn current_pieces(&self) -> &[Coordinates] {
        &self.current_pieces
    }

    /// True while the current team still has penguins to place.
    pub fn is_placement_phase(&self) -> bool {
        self.current_pieces.len() < PENGUINS_PER_TEAM
    }

    /// All candidate moves for the team to move.
    ///
    /// Placement phase: every unoccupied one-fish field, scanning columns
    /// `0..width-1` and rows `0..height-1` (the last column and row are
    /// never offered). Movement phase: the ray-cast moves of every penguin,
    /// without filtering occupied or empty destinations; callers wanting the
    /// stricter rule can check `Board::can_enter`.
    pub fn possible_moves(&self) -> Vec<Move> {
        if self.is_placement_phase() {
            self.placement_moves()
        } else {
            self.current_pieces
                .iter()
                .filter_map(|&piece| self.board.possible_moves_from(piece).ok())
                .flatten()
                .collect()
        }
    }

    fn placement_moves(&self) -> Vec<Move> {
        let width = self.board.width().saturating_sub(1);
        let height = self.board.height().saturating_sub(1);
        let mut moves = Vec::new();
        for x in 0..width {
            for y in 0..height {
                let position = Coordinates::array(x as i32, y as i32);
                let Some(field) = self.board.get_field_or_none(position) else {
                    continue;
                };
                if !field.is_occupied() && field.fish() == Some(1) {
                    moves.push(Move::placement(position.to_double_hex()));
                }
            }
        }
        moves
    }
}

fn current_team_for(start_team: Team, turn: u32) -> Team {
    if turn % 2 == 0 {
        start_team
    } else {
        start_team.opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::penguins::types::Field;

    /// A `size`x`size` board of one-fish floes with `pieces` penguins of each
    /// team placed along the first row.
    fn make_state(size: usize, pieces_one: usize, pieces_two: usize, turn: u32) -> GameState {
        let mut fields = vec![vec![Field::Fish(1); size]; size];
        for x in 0..pieces_one {
            fields[0][x] = Field::Occupied(Team::One);
        }
        for x in 0..pieces_two {
            fields[1][x] = Field::Occupied(Team::Two);
        }
        let board = Board::new(fields).unwrap();
        GameState::new(board, turn, Team::One, Fishes::default(), None)
    }

    #[test]
    fn test_turn_parity() {
        for turn in 0..10 {
            let state = make_state(4, 0, 0, turn);
            let next = make_state(4, 0, 0, turn + 1);
            assert_ne!(state.current_team(), next.current_team());
            assert_eq!(state.other_team(), state.current_team().opponent());
        }
        assert_eq!(make_state(4, 0, 0, 0).current_team(), Team::One);
        assert_eq!(make_state(4, 0, 0, 1).current_team(), Team::Two);
    }

    #[test]
    fn test_round() {
        assert_eq!(make_state(4, 0, 0, 0).round(), 0);
        assert_eq!(make_state(4, 0, 0, 1).round(), 1);
        assert_eq!(make_state(4, 0, 0, 2).round(), 1);
        assert_eq!(make_state(4, 0, 0, 3).round(), 2);
    }

    #[test]
    fn test_current_pieces_follow_turn() {
        let state = make_state(8, 3, 4, 0);
        assert_eq!(state.current_pieces().len(), 3);
        let state = make_state(8, 3, 4, 1);
        assert_eq!(state.current_pieces().len(), 4);
        assert!(state.current_pieces().iter().all(|c| c.is_double));
    }

    #[test]
    fn test_three_pieces_yield_only_placements() {
        let state = make_state(8, 3, 0, 0);
        let moves = state.possible_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(Move::is_placement));
    }

    #[test]
    fn test_four_pieces_yield_only_slides() {
        let state = make_state(8, 4, 0, 0);
        let moves = state.possible_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.from.is_some()));
        for m in &moves {
            assert!(state.current_pieces().contains(&m.from.unwrap()));
        }
    }

    #[test]
    fn test_placement_skips_last_row_and_column() {
        let state = make_state(4, 0, 0, 0);
        let moves = state.possible_moves();
        // 3x3 interior of a 4x4 board
        assert_eq!(moves.len(), 9);
        for m in &moves {
            let array = m.to.to_array();
            assert!(array.x < 3 && array.y < 3);
            assert!(m.to.is_double);
        }
    }

    #[test]
    fn test_placement_requires_single_fish() {
        let fields = vec![
            vec![Field::Fish(1), Field::Fish(2), Field::Fish(1)],
            vec![Field::Occupied(Team::Two), Field::Empty, Field::Fish(1)],
            vec![Field::Fish(1), Field::Fish(1), Field::Fish(1)],
        ];
        let board = Board::new(fields).unwrap();
        let state = GameState::new(board, 0, Team::One, Fishes::default(), None);
        let targets: Vec<_> = state
            .possible_moves()
            .iter()
            .map(|m| m.to.to_array())
            .collect();
        assert_eq!(targets, vec![Coordinates::array(0, 0)]);
    }

    #[test]
    fn test_shared_board() {
        let state = make_state(4, 0, 0, 0);
        let next = GameState::new(state.shared_board(), 1, Team::One, Fishes::new(1, 0), None);
        assert!(Arc::ptr_eq(&state.board, &next.board));
        assert_eq!(next.fishes().get(Team::One), 1);
    }
}
