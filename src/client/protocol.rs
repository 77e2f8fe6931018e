//! Logical packets crossing the serialization boundary.
//!
//! Packets are plain data-transfer types. A `StatePacket` is converted once
//! into an immutable `GameState`; nothing in the domain model knows about
//! the wire.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::games::penguins::{Board, Coordinates, Fishes, GameError, GameState, Move, Team};

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundPacket {
    Error { message: String },
    Joined { room_id: String },
    Left { room_id: String },
    /// A game was prepared; carries one reservation code per player slot.
    Prepared {
        room_id: String,
        #[serde(default)]
        reservations: Vec<String>,
    },
    /// Joined a room as an observer.
    Observed { room_id: String },
    Room { room_id: String, data: RoomPayload },
}

/// Typed content of a room packet.
///
/// Classes other than `move_request`, `state` and `result` decode to
/// `Message` carrying the raw payload, class field included.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomPayload {
    MoveRequest,
    State(StatePacket),
    Result(GameResult),
    /// Anything else the room broadcasts, passed through untouched.
    Message { payload: serde_json::Value },
}

#[derive(Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
enum TaggedPayloadRef<'a> {
    MoveRequest,
    State(&'a StatePacket),
    Result(&'a GameResult),
}

#[derive(Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
enum TaggedPayload {
    MoveRequest,
    State(StatePacket),
    Result(GameResult),
}

const TAGGED_CLASSES: [&str; 3] = ["move_request", "state", "result"];

impl Serialize for RoomPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RoomPayload::MoveRequest => TaggedPayloadRef::MoveRequest.serialize(serializer),
            RoomPayload::State(state) => TaggedPayloadRef::State(state).serialize(serializer),
            RoomPayload::Result(result) => TaggedPayloadRef::Result(result).serialize(serializer),
            RoomPayload::Message { payload } => payload.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RoomPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let class = value.get("class").and_then(serde_json::Value::as_str);
        if !class.is_some_and(|c| TAGGED_CLASSES.contains(&c)) {
            return Ok(RoomPayload::Message { payload: value });
        }
        let tagged = TaggedPayload::deserialize(value).map_err(de::Error::custom)?;
        Ok(match tagged {
            TaggedPayload::MoveRequest => RoomPayload::MoveRequest,
            TaggedPayload::State(state) => RoomPayload::State(state),
            TaggedPayload::Result(result) => RoomPayload::Result(result),
        })
    }
}

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundPacket {
    Join,
    JoinRoom { room_id: String },
    JoinPrepared { reservation_code: String },
    Observe { room_id: String },
    RoomMessage {
        room_id: String,
        payload: serde_json::Value,
    },
    Move {
        room_id: String,
        #[serde(rename = "move")]
        mv: MovePacket,
    },
}

/// Wire coordinates, always double-hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatesPacket {
    pub x: i32,
    pub y: i32,
}

impl From<Coordinates> for CoordinatesPacket {
    fn from(c: Coordinates) -> Self {
        let d = c.to_double_hex();
        Self { x: d.x, y: d.y }
    }
}

impl From<CoordinatesPacket> for Coordinates {
    fn from(c: CoordinatesPacket) -> Self {
        Coordinates::double_hex(c.x, c.y)
    }
}

/// Wire move; `from` is omitted for placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePacket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<CoordinatesPacket>,
    pub to: CoordinatesPacket,
}

impl From<&Move> for MovePacket {
    fn from(m: &Move) -> Self {
        Self {
            from: m.from.map(CoordinatesPacket::from),
            to: m.to.into(),
        }
    }
}

impl From<MovePacket> for Move {
    fn from(m: MovePacket) -> Self {
        Move {
            from: m.from.map(Coordinates::from),
            to: m.to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishesPacket {
    pub fishes_one: u32,
    pub fishes_two: u32,
}

/// A state update. Optional fields may be left out when unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePacket {
    pub turn: u32,
    #[serde(default)]
    pub start_team: Option<String>,
    /// Rows of raw cell text: empty / fish count / team.
    #[serde(default)]
    pub board: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub fishes: Option<FishesPacket>,
    #[serde(default)]
    pub last_move: Option<MovePacket>,
}

impl StatePacket {
    /// Build a snapshot from this packet alone.
    pub fn to_state(&self) -> Result<GameState, GameError> {
        let Some(board) = self.board.as_ref() else {
            let reason = "first state has no board";
            return Err(GameError::IncompleteState(reason.into()));
        };
        let Some(start_team) = self.start_team.as_deref() else {
            let reason = "first state has no start team";
            return Err(GameError::IncompleteState(reason.into()));
        };
        Ok(GameState::new(
            Board::from_raw(board)?,
            self.turn,
            start_team.parse()?,
            self.fishes.map(fishes_from).unwrap_or_default(),
            self.last_move.map(Move::from),
        ))
    }

    /// Build a snapshot on top of `previous`, reusing whatever this packet leaves out.
    pub fn to_state_from(&self, previous: &GameState) -> Result<GameState, GameError> {
        let board = match &self.board {
            Some(rows) => {
                let board = Board::from_raw(rows)?;
                if board == *previous.board() {
                    previous.shared_board()
                } else {
                    Arc::new(board)
                }
            }
            None => previous.shared_board(),
        };
        let start_team = match self.start_team.as_deref() {
            Some(raw) => raw.parse::<Team>()?,
            None => previous.start_team(),
        };
        let fishes = self.fishes.map_or(previous.fishes(), fishes_from);
        Ok(GameState::new(
            board,
            self.turn,
            start_team,
            fishes,
            self.last_move.map(Move::from),
        ))
    }
}

fn fishes_from(packet: FishesPacket) -> Fishes {
    Fishes::new(packet.fishes_one, packet.fishes_two)
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winning team name; `None` for a draw.
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub scores: HashMap<String, u32>,
}
