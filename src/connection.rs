use std::io::Cursor;
use std::mem;

use bytes::{Buf, BytesMut};
use thiserror::Error as ThisError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::frame::{self, Frame};
use crate::pool::BufferPool;

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    /// The peer closed the connection in the middle of a frame.
    #[error("connection reset by peer")]
    ResetByPeer,
    /// The buffered bytes cannot form a valid frame. Recoverable: the
    /// handler may reply with an error and keep reading.
    #[error(transparent)]
    Protocol(#[from] frame::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One client connection. Owns the socket and a read buffer checked out of
/// the shared pool; the buffer goes back to the pool when the connection is
/// dropped, whichever way the handler exits.
pub struct Connection {
    pub id: Uuid,
    stream: TcpStream,
    // Data is read from the socket into the read buffer. When a frame is
    // parsed, the corresponding data is removed from the buffer.
    buffer: BytesMut,
    pool: BufferPool,
}

impl Connection {
    pub fn new(stream: TcpStream, pool: BufferPool) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream,
            buffer: pool.checkout(),
            pool,
        }
    }

    /// Reads one complete frame, buffering as many socket reads as it takes.
    /// Bytes beyond the first frame stay buffered for the next call, which
    /// is what makes pipelined requests work.
    ///
    /// Returns `None` on a clean close (EOF on a frame boundary).
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, ConnectionError> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ConnectionError::ResetByPeer);
            }
        }
    }

    /// Attempts to parse one frame out of the buffered bytes. An incomplete
    /// frame is not an error, just a signal to read more. A malformed frame
    /// poisons the buffered bytes, so they are discarded before the error
    /// is surfaced.
    fn parse_frame(&mut self) -> Result<Option<Frame>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&self.buffer[..]);
        match Frame::parse(&mut cursor) {
            Ok(frame) => {
                let consumed = cursor.position() as usize;
                self.buffer.advance(consumed);
                Ok(Some(frame))
            }
            Err(frame::Error::Incomplete) => Ok(None),
            Err(err) => {
                self.buffer.clear();
                Err(err.into())
            }
        }
    }

    /// Writes a frame and flushes it, so the reply is fully on the wire
    /// before the next frame is read.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), ConnectionError> {
        self.stream.write_all(&frame.serialize()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.pool.checkin(mem::take(&mut self.buffer));
    }
}
