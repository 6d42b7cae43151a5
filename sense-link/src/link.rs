//! Message link over a byte channel
//!
//! [`Link`] wraps anything implementing `embedded_io::Read + Write` (a UART,
//! a host serial port, a test buffer) and moves whole messages across it.
//! It stamps outgoing messages with a wrapping sequence number and reassembles
//! incoming frames with a [`MessageReader`]. [`AsyncLink`] does the same over
//! `embedded_io_async` with the `async` feature.
//!
//! There is no acknowledgement, retransmission or flow control.

use core::fmt;

use crate::codec::MAX_FRAME_SIZE;
use crate::error::DecodeError;
use crate::fmt::{debug, trace};
use crate::message::{Body, Message};
use crate::reader::MessageReader;

/// Receive chunk size
const RX_BUF_SIZE: usize = 32;

/// Errors that can occur on a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The underlying channel failed
    Io(E),
    /// Received bytes did not form a valid frame
    Decode(DecodeError),
    /// The channel reported end of stream
    Closed,
}

impl<E> From<DecodeError> for LinkError<E> {
    fn from(error: DecodeError) -> Self {
        LinkError::Decode(error)
    }
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Io(e) => write!(f, "i/o error: {:?}", e),
            LinkError::Decode(e) => write!(f, "decode error: {}", e),
            LinkError::Closed => f.write_str("channel closed"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for LinkError<E> {}

/// Sequence numbering and receive buffering shared by both link flavours
#[derive(Debug)]
struct Session {
    sequence: u8,
    reader: MessageReader,
    rx: [u8; RX_BUF_SIZE],
    rx_start: usize,
    rx_end: usize,
}

impl Session {
    fn new() -> Self {
        Self {
            sequence: 0,
            reader: MessageReader::new(),
            rx: [0; RX_BUF_SIZE],
            rx_start: 0,
            rx_end: 0,
        }
    }

    /// Build the next outgoing message and advance the sequence number
    fn stamp(&mut self, id: u8, body: Body) -> Message {
        let message = Message::new(id, self.sequence, body);
        self.sequence = self.sequence.wrapping_add(1);
        message
    }

    /// Feed received bytes to the reader until a message or error comes out.
    /// `Ok(None)` means the channel must be read again.
    fn next_buffered(&mut self) -> Result<Option<Message>, DecodeError> {
        while self.rx_start < self.rx_end {
            let byte = self.rx[self.rx_start];
            self.rx_start += 1;
            if let Some(message) = self.reader.feed(byte)? {
                return Ok(Some(message));
            }
        }
        // Bytes left behind a dropped one may already hold a frame
        self.reader.poll()
    }

    fn filled(&mut self, n: usize) {
        self.rx_start = 0;
        self.rx_end = n;
    }
}

fn encode(message: &Message, buffer: &mut [u8; MAX_FRAME_SIZE]) -> usize {
    let len = message.encode(buffer);
    trace!(
        "TX: {} bytes, type {:?} id {} seq {}",
        len,
        message.message_type(),
        message.id,
        message.sequence
    );
    len
}

fn received(message: &Message) {
    trace!(
        "RX: type {:?} id {} seq {}",
        message.message_type(),
        message.id,
        message.sequence
    );
}

/// Blocking message link
#[derive(Debug)]
pub struct Link<T> {
    io: T,
    session: Session,
}

impl<T> Link<T> {
    pub fn new(io: T) -> Self {
        Self {
            io,
            session: Session::new(),
        }
    }

    /// Sequence number the next [`send`](Self::send) will use
    pub fn next_sequence(&self) -> u8 {
        self.session.sequence
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        debug!("link reset, {} bytes discarded", self.session.reader.buffered());
        self.session.reader.reset();
        self.session.filled(0);
    }

    pub fn get_ref(&self) -> &T {
        &self.io
    }

    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: embedded_io::Write> Link<T> {
    /// Send `body` for instance `id` under the next sequence number
    ///
    /// Returns the sequence number used.
    pub fn send(&mut self, id: u8, body: Body) -> Result<u8, LinkError<T::Error>> {
        let message = self.session.stamp(id, body);
        self.send_message(&message)?;
        Ok(message.sequence)
    }

    /// Send a message exactly as given
    pub fn send_message(&mut self, message: &Message) -> Result<(), LinkError<T::Error>> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = encode(message, &mut buffer);
        self.io.write_all(&buffer[..len]).map_err(LinkError::Io)?;
        self.io.flush().map_err(LinkError::Io)
    }
}

impl<T: embedded_io::Read> Link<T> {
    /// Block until a complete message arrives
    ///
    /// A decode error is returned as soon as it is seen; the link keeps its
    /// state, so calling `receive` again continues with the following bytes.
    pub fn receive(&mut self) -> Result<Message, LinkError<T::Error>> {
        loop {
            if let Some(message) = self.session.next_buffered()? {
                received(&message);
                return Ok(message);
            }
            let n = self.io.read(&mut self.session.rx).map_err(LinkError::Io)?;
            if n == 0 {
                return Err(LinkError::Closed);
            }
            self.session.filled(n);
        }
    }
}

/// Async message link
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct AsyncLink<T> {
    io: T,
    session: Session,
}

#[cfg(feature = "async")]
impl<T> AsyncLink<T> {
    pub fn new(io: T) -> Self {
        Self {
            io,
            session: Session::new(),
        }
    }

    /// Sequence number the next [`send`](Self::send) will use
    pub fn next_sequence(&self) -> u8 {
        self.session.sequence
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        debug!("link reset, {} bytes discarded", self.session.reader.buffered());
        self.session.reader.reset();
        self.session.filled(0);
    }

    pub fn get_ref(&self) -> &T {
        &self.io
    }

    pub fn into_inner(self) -> T {
        self.io
    }
}

#[cfg(feature = "async")]
impl<T: embedded_io_async::Write> AsyncLink<T> {
    /// Send `body` for instance `id` under the next sequence number
    ///
    /// Returns the sequence number used.
    pub async fn send(&mut self, id: u8, body: Body) -> Result<u8, LinkError<T::Error>> {
        let message = self.session.stamp(id, body);
        self.send_message(&message).await?;
        Ok(message.sequence)
    }

    /// Send a message exactly as given
    pub async fn send_message(&mut self, message: &Message) -> Result<(), LinkError<T::Error>> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = encode(message, &mut buffer);
        self.io
            .write_all(&buffer[..len])
            .await
            .map_err(LinkError::Io)?;
        self.io.flush().await.map_err(LinkError::Io)
    }
}

#[cfg(feature = "async")]
impl<T: embedded_io_async::Read> AsyncLink<T> {
    /// Wait for a complete message
    ///
    /// Behaves like [`Link::receive`].
    pub async fn receive(&mut self) -> Result<Message, LinkError<T::Error>> {
        loop {
            if let Some(message) = self.session.next_buffered()? {
                received(&message);
                return Ok(message);
            }
            let n = self
                .io
                .read(&mut self.session.rx)
                .await
                .map_err(LinkError::Io)?;
            if n == 0 {
                return Err(LinkError::Closed);
            }
            self.session.filled(n);
        }
    }
}
