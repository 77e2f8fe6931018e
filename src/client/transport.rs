//! Byte-stream side of the client.
//!
//! The session only talks to the `Transport` trait. `TcpTransport` frames
//! each packet as a 4-byte big-endian length prefix followed by its JSON
//! encoding, and uses a read timeout so a blocked read hands control back
//! to the session loop.

use std::io::{self, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::client::error::{ClientError, TransportError};
use crate::client::protocol::{InboundPacket, OutboundPacket};

/// Upper bound for a single frame (16 MB).
pub const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Connection to a game server carrying typed packets.
pub trait Transport {
    fn connect(&mut self) -> Result<(), TransportError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Next packet from the server. `Ok(None)` means nothing arrived yet.
    ///
    /// A frame that does not decode to a known packet is a protocol violation.
    fn receive(&mut self) -> Result<Option<InboundPacket>, ClientError>;

    fn send(&mut self, packet: &OutboundPacket) -> Result<(), TransportError>;
}

/// Write a length-delimited frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), TransportError> {
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    if len > MAX_MESSAGE_SIZE {
        return Err(TransportError::MessageTooLarge(len));
    }
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-delimited frame.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, TransportError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(TransportError::MessageTooLarge(len));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Decode one frame into a packet.
pub fn decode_packet(frame: &[u8]) -> Result<InboundPacket, ClientError> {
    serde_json::from_slice(frame).map_err(|e| {
        ClientError::ProtocolViolation(format!(
            "received object of unknown class ({e}): {}",
            String::from_utf8_lossy(frame)
        ))
    })
}

/// Bytes read from the stream that do not form a whole frame yet.
///
/// Kept across reads so a frame split by a read timeout is resumed, not lost.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Buffered bytes not yet returned as a frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Split off the next frame once its prefix and whole body are buffered.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(prefix) = self
            .pending
            .get(..4)
            .and_then(|p| <[u8; 4]>::try_from(p).ok())
        else {
            return Ok(None);
        };
        let len = u32::from_be_bytes(prefix);
        if len > MAX_MESSAGE_SIZE {
            return Err(TransportError::MessageTooLarge(len));
        }
        let end = 4 + len as usize;
        if self.pending.len() < end {
            return Ok(None);
        }
        let frame = self.pending[4..end].to_vec();
        self.pending.drain(..end);
        Ok(Some(frame))
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

struct Connection {
    stream: TcpStream,
    writer: BufWriter<TcpStream>,
    frames: FrameBuffer,
}

/// Blocking TCP transport.
pub struct TcpTransport {
    addr: String,
    read_timeout: Option<Duration>,
    connection: Option<Connection>,
}

impl TcpTransport {
    pub fn new(host: &str, port: u16, read_timeout: Option<Duration>) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            read_timeout,
            connection: None,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let addrs: Vec<_> = self
            .addr
            .to_socket_addrs()
            .map_err(|e| {
                TransportError::Unavailable(format!("cannot resolve {}: {e}", self.addr))
            })?
            .collect();
        let stream = TcpStream::connect(&addrs[..]).map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut => {
                TransportError::Unavailable(format!("{}: {e}", self.addr))
            }
            _ => TransportError::Io(e),
        })?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_nodelay(true)?;
        let writer = BufWriter::new(stream.try_clone()?);
        self.connection = Some(Connection {
            stream,
            writer,
            frames: FrameBuffer::new(),
        });
        tracing::info!(addr = %self.addr, "connected to server");
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.stream.shutdown(std::net::Shutdown::Both);
            tracing::info!(addr = %self.addr, "disconnected from server");
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn receive(&mut self) -> Result<Option<InboundPacket>, ClientError> {
        let Some(connection) = self.connection.as_mut() else {
            return Ok(None);
        };
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = connection.frames.next_frame()? {
                if frame.is_empty() {
                    return Ok(None);
                }
                return decode_packet(&frame).map(Some);
            }
            match connection.stream.read(&mut chunk) {
                Ok(0) => {
                    let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
                    return Err(TransportError::Io(eof).into());
                }
                Ok(n) => connection.frames.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_timeout(&e) => {
                    if connection.frames.pending() > 0 {
                        tracing::debug!(
                            buffered = connection.frames.pending(),
                            "read timed out mid-frame"
                        );
                    }
                    return Ok(None);
                }
                Err(e) => return Err(TransportError::Io(e).into()),
            }
        }
    }

    fn send(&mut self, packet: &OutboundPacket) -> Result<(), TransportError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| TransportError::Unavailable("not connected".into()))?;
        let json = serde_json::to_vec(packet)?;
        write_frame(&mut connection.writer, &json)
    }
}
