//! Board logic: bounded field lookups and ray-cast move enumeration.
//!
//! Storage is row-major: `fields[y][x]`, with `x` in `0..width` and `y` in
//! `0..height`. Public methods accept either coordinate representation and
//! normalize to array form before indexing.

use super::coordinates::{Coordinates, Vector, DIRECTIONS};
use super::types::{Field, GameError, Move, Team};

/// Rectangular grid of fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    fields: Vec<Vec<Field>>,
}

impl Board {
    /// Build a board from rows of fields. All rows must have equal length.
    pub fn new(fields: Vec<Vec<Field>>) -> Result<Self, GameError> {
        if let Some(first) = fields.first() {
            let width = first.len();
            let ragged = fields.iter().position(|row| row.len() != width);
            if let Some(y) = ragged {
                return Err(GameError::InvalidInput(format!(
                    "row {y} has {} fields, expected {width}",
                    fields[y].len()
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Build a board from the raw cell text of each row.
    pub fn from_raw<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, GameError> {
        let fields = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| Field::from_raw(cell.as_ref()))
                    .collect()
            })
            .collect::<Result<Vec<Vec<Field>>, GameError>>()?;
        Self::new(fields)
    }

    pub fn width(&self) -> usize {
        self.fields.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.fields.len()
    }

    pub fn is_valid(&self, coordinates: Coordinates) -> bool {
        self.index_of(coordinates).is_some()
    }

    /// Array indices of `coordinates`, if in bounds.
    fn index_of(&self, coordinates: Coordinates) -> Option<(usize, usize)> {
        let array = coordinates.to_array();
        let x = usize::try_from(array.x).ok()?;
        let y = usize::try_from(array.y).ok()?;
        (x < self.width() && y < self.height()).then_some((x, y))
    }

    pub fn get_field(&self, coordinates: Coordinates) -> Result<&Field, GameError> {
        self.get_field_or_none(coordinates).ok_or_else(|| {
            let array = coordinates.to_array();
            GameError::OutOfRange {
                x: array.x,
                y: array.y,
            }
        })
    }

    pub fn get_field_or_none(&self, coordinates: Coordinates) -> Option<&Field> {
        self.index_of(coordinates).map(|(x, y)| &self.fields[y][x])
    }

    /// Field at a flat row-major index.
    pub fn field_by_index(&self, index: usize) -> Result<&Field, GameError> {
        let width = self.width().max(1);
        let (x, y) = (index % width, index / width);
        self.get_field(Coordinates::array(x as i32, y as i32))
    }

    pub fn all_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().flatten()
    }

    /// Array coordinates paired with their field, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Coordinates, &Field)> + '_ {
        self.fields.iter().enumerate().flat_map(|(y, row)| {
            let y = y as i32;
            row.iter()
                .enumerate()
                .map(move |(x, field)| (Coordinates::array(x as i32, y), field))
        })
    }

    pub fn are_fields_empty(&self) -> bool {
        self.all_fields().all(Field::is_empty)
    }

    pub fn is_occupied(&self, coordinates: Coordinates) -> Result<bool, GameError> {
        Ok(self.get_field(coordinates)?.is_occupied())
    }

    /// A penguin may stop here: in bounds, unoccupied and still carrying fish.
    pub fn can_enter(&self, coordinates: Coordinates) -> bool {
        self.get_field_or_none(coordinates)
            .is_some_and(|field| !field.is_occupied() && !field.is_empty())
    }

    /// Array coordinates of every field that differs from `other`.
    pub fn diff(&self, other: &Board) -> Result<Vec<Coordinates>, GameError> {
        if self.width() != other.width() || self.height() != other.height() {
            return Err(GameError::InvalidInput(format!(
                "cannot compare {}x{} board with {}x{} board",
                self.width(),
                self.height(),
                other.width(),
                other.height()
            )));
        }
        Ok(self
            .cells()
            .zip(other.all_fields())
            .filter(|((_, a), b)| a != b)
            .map(|((pos, _), _)| pos)
            .collect())
    }

    /// Every in-bounds destination along `direction`, regardless of occupancy.
    ///
    /// The ray stops at the first step that leaves the board, and after at
    /// most `max(width, height)` steps. A zero vector yields no moves.
    pub fn moves_in_direction(&self, origin: Coordinates, direction: Vector) -> Vec<Move> {
        if direction == Vector::default() {
            return Vec::new();
        }
        let origin = origin.to_double_hex();
        let max_steps = self.width().max(self.height()) as i32;
        (1..=max_steps)
            .map(|i| origin.add_vector(direction.scale(i)))
            .take_while(|&destination| self.is_valid(destination))
            .map(|destination| Move::slide(origin, destination))
            .collect()
    }

    /// Ray-cast moves in all six directions.
    pub fn possible_moves_from(&self, position: Coordinates) -> Result<Vec<Move>, GameError> {
        if !self.is_valid(position) {
            let array = position.to_array();
            return Err(GameError::OutOfRange {
                x: array.x,
                y: array.y,
            });
        }
        Ok(DIRECTIONS
            .iter()
            .flat_map(|&direction| self.moves_in_direction(position, direction))
            .collect())
    }

    /// Fields holding a penguin of either team.
    pub fn penguins(&self) -> Vec<&Field> {
        self.all_fields()
            .filter(|field| field.is_occupied())
            .collect()
    }

    /// Double-hex positions of `team`'s penguins, scanned row by row.
    pub fn team_penguins(&self, team: Team) -> Vec<Coordinates> {
        self.cells()
            .filter(|(_, field)| field.penguin() == Some(team))
            .map(|(pos, _)| pos.to_double_hex())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn board_from(rows: &[&[&str]]) -> Board {
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
        Board::from_raw(&rows).unwrap()
    }

    fn empty_board(width: usize, height: usize) -> Board {
        Board::new(vec![vec![Field::Empty; width]; height]).unwrap()
    }

    #[test]
    fn test_bounds_on_small_board() {
        let board = empty_board(2, 2);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert!(board.is_valid(Coordinates::array(x, y)));
        }
        assert!(!board.is_valid(Coordinates::array(2, 0)));
        assert!(!board.is_valid(Coordinates::array(0, -1)));
        assert_eq!(
            board.get_field(Coordinates::array(2, 0)),
            Err(GameError::OutOfRange { x: 2, y: 0 })
        );
        assert_eq!(board.get_field_or_none(Coordinates::array(2, 0)), None);
    }

    #[test]
    fn test_bounds_match_dimensions() {
        let board = empty_board(5, 3);
        for y in -2..6 {
            for x in -2..8 {
                let expected = (0..5).contains(&x) && (0..3).contains(&y);
                let valid = board.is_valid(Coordinates::array(x, y));
                assert_eq!(valid, expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_double_hex_lookup() {
        let board = board_from(&[&["1", "2"], &["3", "ONE"]]);
assert_eq!(
            board.get_field(Coordinates::double_hex(3, 1)),
            Ok(&Field::Occupied(Team::One))
        );
        assert_eq!(
            board.get_field(Coordinates::double_hex(2, 0)),
            Ok(&Field::Fish(2))
        );
        assert_eq!(board.is_occupied(Coordinates::array(1, 1)), Ok(true));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows = vec![vec!["1", "1"], vec!["1"]];
assert!(matches!(
            Board::from_raw(&rows),
            Err(GameError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_field_by_index_and_scans() {
        let board = board_from(&[&["1", "TWO", "0"], &["2", "3", "ONE"]]);
        assert_eq!(board.field_by_index(1), Ok(&Field::Occupied(Team::Two)));
        assert_eq!(board.field_by_index(5), Ok(&Field::Occupied(Team::One)));
        assert!(board.field_by_index(6).is_err());
        assert_eq!(board.all_fields().count(), 6);
        assert_eq!(board.penguins().len(), 2);
        assert!(!board.are_fields_empty());
assert_eq!(
            board.team_penguins(Team::One),
            vec![Coordinates::double_hex(5, 1)]
        );
        assert_eq!(
            board.team_penguins(Team::Two),
            vec![Coordinates::double_hex(2, 0)]
        );
    }

    #[test]
    fn test_can_enter() {
        let board = board_from(&[&["1", "TWO", "0"]]);
        assert!(board.can_enter(Coordinates::array(0, 0)));
        assert!(!board.can_enter(Coordinates::array(1, 0)));
        assert!(!board.can_enter(Coordinates::array(2, 0)));
        assert!(!board.can_enter(Coordinates::array(3, 0)));
    }

    #[test]
    fn test_diff() {
        let a = board_from(&[&["1", "2"], &["3", "4"]]);
        let b = board_from(&[&["1", "ONE"], &["3", "0"]]);
        assert_eq!(a.diff(&a), Ok(vec![]));
        assert_eq!(
            a.diff(&b),
            Ok(vec![Coordinates::array(1, 0), Coordinates::array(1, 1)])
        );
        assert!(a.diff(&empty_board(3, 2)).is_err());
    }

    #[test]
    fn test_moves_in_direction_stops_at_edge() {
        let board = empty_board(4, 4);
        let origin = Coordinates::array(0, 0);
        // right: (0,0) (1,0) (2,0) (3,0)
        let moves = board.moves_in_direction(origin, Vector::new(2, 0));
        let targets: Vec<_> = moves.iter().map(|m| m.to.to_array()).collect();
        assert_eq!(
            targets,
            vec![
                Coordinates::array(1, 0),
                Coordinates::array(2, 0),
                Coordinates::array(3, 0)
            ]
        );
        let from = Some(Coordinates::double_hex(0, 0));
        assert!(moves.iter().all(|m| m.from == from));
        // left leaves the board immediately
        let left = board.moves_in_direction(origin, Vector::new(-2, 0));
        assert!(left.is_empty());
    }

    #[test]
    fn test_degenerate_directions_terminate() {
        let board = Board::new(vec![vec![Field::Fish(1); 2]; 2]).unwrap();
        let origin = Coordinates::array(0, 0);
        let still = board.moves_in_direction(origin, Vector::default());
        assert!(still.is_empty());

        // a non-hex step still ends at the edge
        let moves = board.moves_in_direction(origin, Vector::new(1, 0));
        assert!(moves.len() <= 2);
        assert!(moves.iter().all(|m| board.is_valid(m.to)));
    }

    #[test]
    fn test_ray_cast_ignores_occupancy() {
        let board = board_from(&[&["1", "ONE", "0", "1"]]);
        let moves = board.moves_in_direction(Coordinates::array(0, 0), Vector::new(2, 0));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_possible_moves_from() {
        let board = empty_board(3, 3);
        // centre of a 3x3 board: array (1,1) = double-hex (3,1)
        let moves = board.possible_moves_from(Coordinates::array(1, 1)).unwrap();
        let mut targets: Vec<_> = moves.iter().map(|m| (m.to.x, m.to.y)).collect();
        targets.sort();
        // up right (4,0), left (1,1), down right (4,2), down left (2,2), right (5,1), up left (2,0)
assert_eq!(
            targets,
            vec![(1, 1), (2, 0), (2, 2), (4, 0), (4, 2), (5, 1)]
        );

        assert_eq!(
            board.possible_moves_from(Coordinates::array(3, 0)),
            Err(GameError::OutOfRange { x: 3, y: 0 })
        );
    }
}
