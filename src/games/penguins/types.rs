//! Domain types for Penguins: teams, fields, fish score and moves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinates::{Coordinates, Vector};

/// Number of penguins each team places before the movement phase starts.
pub const PENGUINS_PER_TEAM: usize = 4;

/// Errors raised by the board model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Malformed field, team or coordinate input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Strict lookup outside the board.
    #[error("index out of range: [x={x}, y={y}]")]
    OutOfRange { x: i32, y: i32 },

    /// A state packet lacks data that no earlier snapshot can supply.
    #[error("incomplete state: {0}")]
    IncompleteState(String),
}

/// One of the two fixed teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub fn name(&self) -> &'static str {
        match self {
            Team::One => "ONE",
            Team::Two => "TWO",
        }
    }

    /// Display color.
    pub fn color(&self) -> &'static str {
        match self {
            Team::One => "Rot",
            Team::Two => "Blau",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Team::One => 'R',
            Team::Two => 'B',
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.name())
    }
}

/// Accepts the team name (`ONE`/`TWO`) or its letter (`R`/`B`).
impl FromStr for Team {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ONE" | "R" => Ok(Team::One),
            "TWO" | "B" => Ok(Team::Two),
            other => Err(GameError::InvalidInput(format!("unknown team: {other:?}"))),
        }
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Field {
    /// No ice floe left (or never any fish).
    #[default]
    Empty,
    Fish(u32),
    Occupied(Team),
}

impl Field {
    /// Build a field from the raw text the server sends for a cell.
    ///
    /// `""` and `"0"` are empty, digits are a fish count, letters name a team.
    pub fn from_raw(raw: &str) -> Result<Field, GameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Field::Empty);
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            return match raw.parse::<u32>() {
                Ok(0) => Ok(Field::Empty),
                Ok(n) => Ok(Field::Fish(n)),
                Err(_) => Err(GameError::InvalidInput(format!(
                    "fish count out of range: {raw:?}"
                ))),
            };
        }
        if raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return raw.parse::<Team>().map(Field::Occupied);
        }
        Err(GameError::InvalidInput(format!(
            "the field's input is wrong: {raw:?}"
        )))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Empty)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Field::Occupied(_))
    }

    /// Fish on this field; `None` while a penguin stands on it.
    pub fn fish(&self) -> Option<u32> {
        match self {
            Field::Empty => Some(0),
            Field::Fish(n) => Some(*n),
            Field::Occupied(_) => None,
        }
    }

    pub fn penguin(&self) -> Option<Team> {
        match self {
            Field::Occupied(team) => Some(*team),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Empty => write!(f, "empty"),
            Field::Fish(n) => write!(f, "{n} fish(es)"),
            Field::Occupied(team) => write!(f, "occupied by {team}"),
        }
    }
}

/// Fish collected by each team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fishes {
    pub fishes_one: u32,
    pub fishes_two: u32,
}

impl Fishes {
    pub fn new(fishes_one: u32, fishes_two: u32) -> Self {
        Self {
            fishes_one,
            fishes_two,
        }
    }

    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::One => self.fishes_one,
            Team::Two => self.fishes_two,
        }
    }
}

/// A move: a placement when `from` is `None`, otherwise a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Option<Coordinates>,
    pub to: Coordinates,
}

impl Move {
    pub fn placement(to: Coordinates) -> Self {
        Self { from: None, to }
    }

    pub fn slide(from: Coordinates, to: Coordinates) -> Self {
        Self {
            from: Some(from),
            to,
        }
    }

    /// Slide from `origin` along `delta`.
    pub fn from_delta(origin: Coordinates, delta: Vector) -> Self {
        Self::slide(origin, origin.add_vector(delta))
    }

    pub fn is_placement(&self) -> bool {
        self.from.is_none()
    }

    /// Destination minus origin; `None` for placements.
    pub fn delta(&self) -> Option<Vector> {
        self.from.map(|from| self.to.distance(&from))
    }

    /// Swap origin and destination; `None` for placements.
    pub fn reversed(&self) -> Option<Move> {
        self.from.map(|from| Move::slide(self.to, from))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "Move from {} to {}", from, self.to),
            None => write!(f, "Move to {}", self.to),
        }
    }
}
