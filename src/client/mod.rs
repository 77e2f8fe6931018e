//! Client side of a Penguins game: transport, protocol dispatch and the
//! session lifecycle around a pluggable decision logic.

pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod protocol;
pub mod session;
pub mod strategy;
pub mod transport;

pub use config::{load_config, load_default_config, ClientConfig, JoinMode};
pub use error::{ClientError, TransportError};
pub use handler::{ClientHandler, SessionStatus};
pub use history::{HistoryEntry, SessionHistory};
pub use protocol::{GameResult, InboundPacket, OutboundPacket, RoomPayload, StatePacket};
pub use session::{GameClient, SessionState};
pub use strategy::{GreedyLogic, RandomLogic};
pub use transport::{TcpTransport, Transport};
