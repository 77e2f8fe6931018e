//! Session and transport errors.

use std::io;

use thiserror::Error;

use crate::games::penguins::GameError;

/// Failures of the byte-stream layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection could be established (refused, timed out, or not yet connected).
    #[error("server unavailable: {0}")]
    Unavailable(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("message too large: {0} bytes")]
    MessageTooLarge(u32),
}

impl TransportError {
    /// Whether a failed connect attempt may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Unavailable(_) => true,
            TransportError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::NotConnected
            ),
            TransportError::Codec(_) | TransportError::MessageTooLarge(_) => false,
        }
    }
}

/// Errors that end a client session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server or transport delivered something the client cannot handle.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    State(#[from] GameError),

    #[error("configuration error: {0}")]
    Config(String),
}
