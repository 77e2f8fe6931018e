//! GameClient: connection lifecycle, packet dispatch and the turn cycle.
//!
//! Single-threaded and blocking: one loop reads a packet, dispatches it to
//! completion (including the synchronous move calculation) and only then
//! reads the next one.
//!
//! ```text
//! Disconnected ──▶ AwaitingJoin ──▶ InRoom ──▶ RoomLeft ──┬──▶ Reconnecting ──▶ AwaitingJoin
//!                                                        ├──▶ SurviveIdle
//!                                                        └──▶ Stopped
//! ```

use std::sync::Arc;
use std::time::Instant;

use crate::client::config::{ClientConfig, JoinMode};
use crate::client::error::{ClientError, TransportError};
use crate::client::handler::{ClientHandler, SessionStatus};
use crate::client::history::{HistoryEntry, SessionHistory};
use crate::client::protocol::{InboundPacket, MovePacket, OutboundPacket, RoomPayload, StatePacket};
use crate::client::transport::Transport;
use crate::games::penguins::Move;

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Connected; a join request may be outstanding.
    AwaitingJoin,
    InRoom { room_id: String },
    RoomLeft,
    Reconnecting { attempt: u32 },
    /// The server left and survive mode keeps the process idling.
    SurviveIdle,
    Stopped,
}

/// A client session bound to one transport and one decision logic.
pub struct GameClient<T: Transport, H: ClientHandler> {
    transport: T,
    handler: H,
    config: ClientConfig,
    history: SessionHistory,
    state: SessionState,
    running: bool,
    awaiting_rejoin: bool,
}

impl<T: Transport, H: ClientHandler> GameClient<T, H> {
    pub fn new(transport: T, handler: H, config: ClientConfig) -> Self {
        Self {
            transport,
            handler,
            config,
            history: SessionHistory::new(),
            state: SessionState::Disconnected,
            running: false,
            awaiting_rejoin: true,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True between a room-left and the next join.
    pub fn is_awaiting_rejoin(&self) -> bool {
        self.awaiting_rejoin
    }

    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.transport.connect()?;
        self.state = SessionState::AwaitingJoin;
        Ok(())
    }

    /// Connect if needed, join, and run the loop until the session stops.
    pub fn start(&mut self) -> Result<(), ClientError> {
        if !self.transport.is_connected() {
            self.connect()?;
        }
        self.join()?;
        self.run()
    }

    /// Send the join request the configuration asks for and open a new history slot.
    pub fn join(&mut self) -> Result<(), TransportError> {
        match self.config.join_mode() {
            JoinMode::Reservation(code) => self.join_game_with_reservation(&code)?,
            JoinMode::Room(room_id) => self.join_game_room(&room_id)?,
            JoinMode::Fresh => self.join_game()?,
        }
        self.awaiting_rejoin = false;
        self.state = SessionState::AwaitingJoin;
        self.history.start_game();
        Ok(())
    }

    pub fn join_game(&mut self) -> Result<(), TransportError> {
        tracing::info!("joining any open game");
        self.transport.send(&OutboundPacket::Join)
    }

    pub fn join_game_room(&mut self, room_id: &str) -> Result<(), TransportError> {
        tracing::info!(room_id, "joining room");
        self.transport.send(&OutboundPacket::JoinRoom {
            room_id: room_id.into(),
        })
    }

    pub fn join_game_with_reservation(&mut self, reservation: &str) -> Result<(), TransportError> {
        tracing::info!(reservation, "joining with reservation");
        self.transport.send(&OutboundPacket::JoinPrepared {
            reservation_code: reservation.into(),
        })
    }

    /// Watch a room without playing in it. Opens a new history slot.
    pub fn observe_room(&mut self, room_id: &str) -> Result<(), TransportError> {
        tracing::info!(room_id, "requesting to observe room");
        self.transport.send(&OutboundPacket::Observe {
            room_id: room_id.into(),
        })?;
        self.history.start_game();
        Ok(())
    }

    pub fn send_message_to_room(
        &mut self,
        room_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), TransportError> {
        self.transport.send(&OutboundPacket::RoomMessage {
            room_id: room_id.into(),
            payload,
        })
    }

    pub fn send_move(&mut self, room_id: &str, mv: &Move) -> Result<(), TransportError> {
        self.transport.send(&OutboundPacket::Move {
            room_id: room_id.into(),
            mv: MovePacket::from(mv),
        })
    }

    /// Receive-dispatch loop. Returns `Ok` on every orderly stop and `Err`
    /// only for fatal protocol violations.
    pub fn run(&mut self) -> Result<(), ClientError> {
        self.running = true;
        while self.running {
            if !self.transport.is_connected() {
                let status = SessionStatus {
                    state: &self.state,
                    running: self.running,
                    history: &self.history,
                };
                if !self.handler.while_disconnected(&status) {
                    self.stop();
                }
                continue;
            }

            let packet = match self.transport.receive() {
                Ok(Some(packet)) => packet,
                Ok(None) => continue,
                Err(ClientError::Transport(e)) => {
                    self.connection_lost(&e);
                    continue;
                }
                Err(e) => return Err(self.fail(e)),
            };
            tracing::debug!(?packet, "received new object");

            match self.dispatch(packet) {
                Ok(()) => {}
                Err(ClientError::Transport(e)) => self.connection_lost(&e),
                Err(ClientError::State(e)) => {
                    return Err(self.fail(ClientError::ProtocolViolation(format!(
                        "state update could not be built: {e}"
                    ))));
                }
                Err(e) => return Err(self.fail(e)),
            }
            self.sweep();
        }
        tracing::info!("done");
        Ok(())
    }

    /// Route one inbound packet to its handler.
    pub fn dispatch(&mut self, packet: InboundPacket) -> Result<(), ClientError> {
        match packet {
            InboundPacket::Error { message } => {
                tracing::error!(%message, "an error occurred while handling the request");
                self.history.push(HistoryEntry::Error(message.clone()));
                self.handler.on_error(&message);
                self.stop();
            }
            InboundPacket::Left { room_id } => {
                tracing::info!(room_id, "server left the room");
                self.handler.on_game_left();
                self.handle_left();
            }
            InboundPacket::Joined { room_id } => {
                tracing::info!(room_id, "joined room");
                self.enter_room(&room_id);
                self.handler.on_game_joined(&room_id);
            }
            InboundPacket::Prepared {
                room_id,
                reservations,
            } => {
                tracing::info!(room_id, slots = reservations.len(), "game prepared");
                self.handler.on_game_prepared(&room_id, &reservations);
            }
            InboundPacket::Observed { room_id } => {
                tracing::info!(room_id, "observing room");
                self.enter_room(&room_id);
                self.handler.on_game_observed(&room_id);
            }
            InboundPacket::Room { room_id, data } => {
                self.enter_room(&room_id);
                match data {
                    RoomPayload::MoveRequest => self.on_move_request(&room_id)?,
                    RoomPayload::State(packet) => self.on_state(&packet)?,
                    RoomPayload::Result(result) => {
                        tracing::info!(room_id, winner = ?result.winner, "game over");
                        self.history.push(HistoryEntry::Result(result.clone()));
                        self.handler.on_game_over(&result);
                    }
                    RoomPayload::Message { payload } => self.handler.on_room_message(&payload),
                }
            }
        }
        Ok(())
    }

    fn enter_room(&mut self, room_id: &str) {
        if !matches!(&self.state, SessionState::InRoom { room_id: current } if current == room_id) {
            self.state = SessionState::InRoom {
                room_id: room_id.into(),
            };
        }
    }

    fn on_move_request(&mut self, room_id: &str) -> Result<(), ClientError> {
        let start = Instant::now();
        match self.handler.calculate_move() {
            Some(mv) => {
                self.send_move(room_id, &mv)?;
                tracing::info!(
                    room_id,
                    %mv,
                    seconds = format!("{:.3}", start.elapsed().as_secs_f64()),
                    "sent move"
                );
            }
            None => {
                tracing::error!(room_id, "logic returned no valid move, nothing sent");
            }
        }
        Ok(())
    }

    /// Build the next snapshot, diffing against the last one of this game if any.
    fn on_state(&mut self, packet: &StatePacket) -> Result<(), ClientError> {
        let state = match self.history.last_state() {
            Some(previous) => packet.to_state_from(previous)?,
            None => packet.to_state()?,
        };
        let state = Arc::new(state);
        tracing::debug!(turn = state.turn(), team = %state.current_team(), "state update");
        self.history.push(HistoryEntry::State(Arc::clone(&state)));
        self.handler.on_update(state);
        Ok(())
    }

    /// Room left: disconnect, then reconnect, idle or stop depending on config.
    fn handle_left(&mut self) {
        self.awaiting_rejoin = true;
        self.state = SessionState::RoomLeft;
        self.transport.disconnect();

        if self.config.survive {
            tracing::info!(
                "the server left, survive mode keeps the client running until stopped"
            );
            self.state = SessionState::SurviveIdle;
            let status = SessionStatus {
                state: &self.state,
                running: self.running,
                history: &self.history,
            };
            if !self.handler.while_disconnected(&status) {
                self.stop();
                return;
            }
            if !self.config.auto_reconnect {
                return;
            }
        }

        if self.config.auto_reconnect {
            tracing::info!("the server left, trying to reconnect");
            match self.reconnect() {
                Ok(true) => {
                    if let Err(e) = self.join() {
                        tracing::error!(error = %e, "could not rejoin after reconnecting");
                        self.stop();
                    }
                }
                Ok(false) => {
                    tracing::info!(
                        attempts = self.config.reconnect_attempts,
                        "could not reconnect to the server"
                    );
                    self.stop();
                }
                Err(e) => {
                    tracing::error!(error = %e, "could not reconnect due to a previous error");
                    self.stop();
                }
            }
            return;
        }

        tracing::info!("the server left");
        self.stop();
    }

    /// Up to `reconnect_attempts` tries, spaced by `reconnect_delay`.
    ///
    /// `Ok(false)` when every attempt failed with a retryable error.
    fn reconnect(&mut self) -> Result<bool, TransportError> {
        let attempts = self.config.reconnect_attempts;
        for attempt in 1..=attempts {
            self.state = SessionState::Reconnecting { attempt };
            tracing::info!(attempt, "trying to establish a connection with the server");
            match self.transport.connect() {
                Ok(()) if self.transport.is_connected() => {
                    tracing::info!(attempt, "reconnected to server");
                    self.state = SessionState::AwaitingJoin;
                    return Ok(true);
                }
                Ok(()) => {}
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempt, error = %e, "reconnect attempt failed");
                }
                Err(e) => return Err(e),
            }
            if attempt < attempts {
                std::thread::sleep(self.config.reconnect_delay());
            }
        }
        Ok(false)
    }

    /// A read or send failed: treat it like the server leaving.
    fn connection_lost(&mut self, error: &TransportError) {
        tracing::warn!(error = %error, "connection lost");
        self.handle_left();
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        tracing::error!(error = %error, "fatal error, stopping client");
        self.stop();
        error
    }

    /// Drop history of finished games beyond the configured retention.
    fn sweep(&mut self) {
        let removed = self.history.sweep(self.config.history_retention);
        if removed > 0 {
            tracing::debug!(removed, "swept finished games from history");
        }
    }

    /// Disconnect and end the loop. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.state != SessionState::Stopped {
            tracing::info!("shutting down");
        }
        if self.transport.is_connected() {
            self.transport.disconnect();
        }
        self.running = false;
        self.state = SessionState::Stopped;
    }
}
